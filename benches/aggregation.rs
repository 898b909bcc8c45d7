use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kbsearch::core::{Triple, ValueNormalizer};
use kbsearch::indexing::{
    BuildOptions, DocumentBuilder, IndexSchema, IndexedPredicates, LanguageRegistry, SubjectAggregator,
};

const SUBJECTS: u64 = 1_000;

fn mk_triples() -> Vec<Triple> {
    let mut triples = Vec::new();
    for i in 0..SUBJECTS {
        let subject = format!("<f_m.{:06}>", i);
        triples.push(Triple::new(&subject, "<pr_bin>", &format!("{}", i % 10), 0));
        triples.push(Triple::new(&subject, "<r_type>", "<f_people.person>", 0));
        triples.push(Triple::new(&subject, "<rs_label>", &format!("\"Person {}\"@en", i), 0));
        triples.push(Triple::new(&subject, "<rs_label>", &format!("\"Persona {}\"@es", i), 0));
        triples.push(Triple::new(&subject, "<f_common.topic.description>", "\"A line\\nand another\"@en", 0));
        triples.push(Triple::new(&subject, "<f_people.person.height_meters>", "1.8", 0));
    }
    triples
}

fn bench_aggregation(c: &mut Criterion) {
    let triples = mk_triples();
    let normalizer = ValueNormalizer::new(true);

    c.bench_function("aggregate_subjects", |b| {
        b.iter(|| {
            let mut aggregator = SubjectAggregator::new(normalizer);
            let mut records = 0;
            for triple in &triples {
                records += usize::from(aggregator.accept(black_box(triple)).is_some());
            }
            records + usize::from(aggregator.flush().is_some())
        })
    });

    let predicates: IndexedPredicates = ["rs_label", "r_type", "f_common.topic.description"].into_iter().collect();
    let languages = LanguageRegistry::with_defaults();
    let options = BuildOptions::default();
    let schema = IndexSchema::build(&predicates, &languages, &options);
    let mut aggregator = SubjectAggregator::new(normalizer);
    let mut records: Vec<_> = triples.iter().filter_map(|t| aggregator.accept(t)).collect();
    records.extend(aggregator.flush());

    c.bench_function("build_documents", |b| {
        let builder = DocumentBuilder::new(&schema, &predicates, &languages, &options);
        b.iter(|| {
            for record in &records {
                let _ = builder.build(black_box(record));
            }
        })
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
