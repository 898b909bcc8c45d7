//! kbsearch - indexing, lookup and search over sorted knowledge-base triple dumps
//!
//! This is the main entry point for the kbsearch command-line interface.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use kbsearch::api::SearchApi;
use kbsearch::config::{ConfigFile, IndexConfig, SearchConfig, DEFAULT_CONFIG_FILE};
use kbsearch::indexing::{index_file, LanguageRegistry};
use kbsearch::labels::LabelStore;
use kbsearch::logging::init_logging;
use kbsearch::parsing::{read_list, TripleReader};
use kbsearch::querying::{parse_list, PrintMode, RankerKind};
use kbsearch::render::LabelLookup;
use kbsearch::{Error, Result};
use tracing::{error, info, warn};

/// Subjects read from stdin per lookup batch.
const LOOKUP_BLOCK_SIZE: usize = 1000;

const HOME_ENV: &str = "KB_HOME";

#[derive(Parser, Debug)]
#[command(name = "kbsearch")]
#[command(about = "Index and query knowledge-base triple dumps", long_about = None)]
struct Cli {
    /// Progress and timing output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Home directory, expands `$KB_HOME` in configuration values. Defaults to
    /// the `KB_HOME` environment variable, then the current directory
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Configuration file, defaults to `config.dat` in the home directory
    #[arg(short = 'C', long, global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an index from a sorted triples file
    Index(IndexArgs),
    /// Print the documents of subjects
    Lookup(LookupArgs),
    /// Ranked search over the indexed text
    Search(SearchArgs),
    /// Build the English label store from a triples file
    LabelsBuild(LabelsBuildArgs),
    /// Print labels from a label store
    LabelsGet(LabelsGetArgs),
    /// Print every label of a label store as `subject -> label`
    LabelsDump(LabelsDumpArgs),
    /// Document count and term frequencies of an index
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct IndexArgs {
    /// Triples file, plain or gzipped
    #[arg(short, long)]
    triples: Option<PathBuf>,

    /// Index directory, defaults to `<triples>.index`
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// File listing the predicates to index, one per line
    #[arg(short, long)]
    predicates: Option<PathBuf>,

    /// Index all lines instead of the test-mode prefix
    #[arg(long)]
    full_data: bool,

    /// Keep the segments as written
    #[arg(long)]
    no_optimize: bool,

    #[arg(long)]
    index_predicates: Option<bool>,

    #[arg(long)]
    index_text: Option<bool>,

    #[arg(long)]
    index_language: Option<bool>,

    /// Register en, es and zh when no language is configured
    #[arg(long)]
    default_languages: bool,

    /// Predicate holding the importance of a subject
    #[arg(long)]
    importance_predicate: Option<String>,

    /// Collapse newlines in values
    #[arg(long)]
    normalize_newlines: bool,

    /// Indexing memory budget in megabytes
    #[arg(long)]
    writer_memory_mb: Option<usize>,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Index directory
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// `all`, `subject`, or predicate chains such as `rs_label, r_type>rs_label`
    #[arg(long)]
    print_mode: Option<String>,

    /// Collapse newlines in printed values
    #[arg(long)]
    normalize_newlines: bool,

    /// Let chains revisit subjects already on the path
    #[arg(long)]
    allow_predicate_loops: bool,
}

#[derive(Args, Debug)]
struct LookupArgs {
    /// Subjects separated by commas or whitespace, `-` reads them from stdin
    subjects: String,

    #[command(flatten)]
    query: QueryArgs,
}

#[derive(Args, Debug)]
struct SearchArgs {
    query: String,

    /// Hits to print, -1 for all of them
    #[arg(short, long, allow_hyphen_values = true)]
    max_hits: Option<i64>,

    /// Field searched by the basic ranker
    #[arg(short, long)]
    field: Option<String>,

    /// `basic` or `multi`
    #[arg(short, long, default_value = "basic")]
    ranker: String,

    /// Most hits the ranker collects
    #[arg(long)]
    search_depth: Option<usize>,

    #[command(flatten)]
    query_args: QueryArgs,
}

#[derive(Args, Debug)]
struct LabelsBuildArgs {
    /// Triples file, plain or gzipped
    #[arg(short, long)]
    triples: PathBuf,

    /// Label store to write
    #[arg(short, long)]
    output: PathBuf,

    /// Only take labels from this predicate
    #[arg(short, long)]
    predicate: Option<String>,
}

#[derive(Args, Debug)]
struct LabelsGetArgs {
    /// Label store to read
    #[arg(short, long)]
    labels: PathBuf,

    /// Subjects separated by commas or whitespace
    subjects: String,
}

#[derive(Args, Debug)]
struct LabelsDumpArgs {
    /// Label store to read
    labels: PathBuf,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Field of `--term`
    #[arg(short, long, default_value = "rs_label")]
    field: String,

    /// Count the documents containing this term
    #[arg(short, long)]
    term: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let home = match cli.home.clone().or_else(|| std::env::var_os(HOME_ENV).map(PathBuf::from)) {
        Some(home) => home,
        None => std::env::current_dir().map_err(Error::io("reading the current directory"))?,
    };
    let config_path = cli.config_file.clone().unwrap_or_else(|| home.join(DEFAULT_CONFIG_FILE));
    let config = ConfigFile::load_or_default(&config_path, &home);

    match cli.command {
        Command::Index(args) => run_index(&config, args),
        Command::Lookup(args) => run_lookup(&config, args),
        Command::Search(args) => run_search(&config, args),
        Command::LabelsBuild(args) => run_labels_build(args),
        Command::LabelsGet(args) => run_labels_get(args),
        Command::LabelsDump(args) => run_labels_dump(args),
        Command::Stats(args) => run_stats(&config, args),
    }
}

fn run_index(file: &ConfigFile, args: IndexArgs) -> Result<()> {
    let mut config = IndexConfig::from_file(file)?;
    if let Some(triples) = args.triples {
        config.triples_file = Some(triples);
    }
    if let Some(index) = args.index {
        config.index_directory = Some(index);
    }
    if let Some(predicates) = args.predicates {
        config.indexed_predicates_file = Some(predicates);
    }
    if args.default_languages && config.languages.is_empty() {
        config.languages = LanguageRegistry::with_defaults();
    }
    if let Some(predicate) = args.importance_predicate {
        config.build.importance_predicate = predicate;
    }
    if let Some(on) = args.index_predicates {
        config.build.index_predicates = on;
    }
    if let Some(on) = args.index_text {
        config.build.index_text = on;
    }
    if let Some(on) = args.index_language {
        config.build.index_language = on;
    }
    if let Some(megabytes) = args.writer_memory_mb {
        config.writer_memory = megabytes * 1024 * 1024;
    }
    config.full_data = args.full_data;
    config.optimize = !args.no_optimize;
    config.normalize_newlines = args.normalize_newlines;

    let start = Instant::now();
    let stats = index_file(&config)?;
    info!(
        "Indexed {} triples from {} lines into {} documents in {:.1}s",
        stats.triples,
        stats.lines_read,
        stats.documents,
        start.elapsed().as_secs_f64()
    );
    if stats.blank_lines > 0 {
        warn!("Skipped {} blank lines", stats.blank_lines);
    }
    if stats.truncated {
        warn!("Stopped at the test-mode line limit, use --full-data to index everything");
    }
    Ok(())
}

fn search_config(file: &ConfigFile, args: &QueryArgs) -> Result<SearchConfig> {
    let mut config = SearchConfig::from_file(file)?;
    if let Some(index) = &args.index {
        config.index_directory = Some(index.clone());
    }
    if let Some(mode) = &args.print_mode {
        config.print_mode = mode.clone();
    }
    config.normalize_newlines |= args.normalize_newlines;
    config.suppress_predicate_loops = !args.allow_predicate_loops;
    Ok(config)
}

fn run_lookup(file: &ConfigFile, args: LookupArgs) -> Result<()> {
    let start = Instant::now();
    let api = SearchApi::open(search_config(file, &args.query)?)?;
    let mode = PrintMode::parse(&api.config().print_mode);
    let setup = start.elapsed();

    let mut query_time = Duration::ZERO;
    let mut display_time = Duration::ZERO;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut lookup_block = |subjects: &[String]| -> Result<()> {
        for subject in subjects {
            let started = Instant::now();
            let doc = api.lookup(subject, &mode)?;
            query_time += started.elapsed();

            let started = Instant::now();
            match doc {
                Some(doc) => {
                    let text = api.print(&doc, None, &mode)?;
                    out.write_all(text.as_bytes()).map_err(Error::io("writing results"))?;
                }
                None => warn!("Not found: {}", subject),
            }
            display_time += started.elapsed();
        }
        Ok(())
    };

    if args.subjects.trim() == "-" {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        loop {
            let block = read_list(&mut input, Some(LOOKUP_BLOCK_SIZE))?;
            if block.is_empty() {
                break;
            }
            lookup_block(&block)?;
        }
    } else {
        lookup_block(&parse_list(&args.subjects))?;
    }

    info!(
        "Lookup time: setup {} ms, query {} ms, display {} ms",
        setup.as_millis(),
        query_time.as_millis(),
        display_time.as_millis()
    );
    Ok(())
}

fn run_search(file: &ConfigFile, args: SearchArgs) -> Result<()> {
    let start = Instant::now();
    let mut config = search_config(file, &args.query_args)?;
    if let Some(max_hits) = args.max_hits {
        config.max_hits = max_hits;
    }
    if let Some(field) = args.field {
        config.default_search_field = field;
    }
    if let Some(depth) = args.search_depth {
        config.search_depth = depth;
    }
    let ranker: RankerKind = args.ranker.parse()?;
    let api = SearchApi::open(config)?;
    let mode = PrintMode::parse(&api.config().print_mode);
    let setup = start.elapsed();

    let started = Instant::now();
    let outcome = api.search(&args.query, ranker, api.config().hit_limit(), mode.projection().as_ref())?;
    let query_time = started.elapsed();
    info!("Found {} hits, showing {}", outcome.total_hits, outcome.documents.len());

    let started = Instant::now();
    let show_scores = api.config().max_hits >= 0;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for hit in &outcome.documents {
        let score = show_scores.then_some(hit.score);
        let text = api.print(&hit.doc, score, &mode)?;
        out.write_all(text.as_bytes()).map_err(Error::io("writing results"))?;
    }

    info!(
        "Search time: setup {} ms, query {} ms, display {} ms",
        setup.as_millis(),
        query_time.as_millis(),
        started.elapsed().as_millis()
    );
    Ok(())
}

fn run_labels_build(args: LabelsBuildArgs) -> Result<()> {
    let start = Instant::now();
    let reader = TripleReader::open(&args.triples)?;
    let store = LabelStore::build_from_triples(reader, args.predicate.as_deref())?;
    store.save_to_file(&args.output)?;
    info!(
        "Wrote {} labels to {} in {:.1}s",
        store.len(),
        args.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_labels_get(args: LabelsGetArgs) -> Result<()> {
    let store = LabelStore::load_from_file(&args.labels)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for subject in parse_list(&args.subjects) {
        match store.english_label(&subject)? {
            Some(label) => writeln!(out, "{}\t{}", subject, label).map_err(Error::io("writing results"))?,
            None => warn!("Not found: {}", subject),
        }
    }
    Ok(())
}

fn run_labels_dump(args: LabelsDumpArgs) -> Result<()> {
    let store = LabelStore::load_from_file(&args.labels)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let count = store.dump(&mut out)?;
    info!("Dumped {} labels", count);
    Ok(())
}

fn run_stats(file: &ConfigFile, args: StatsArgs) -> Result<()> {
    let mut config = SearchConfig::from_file(file)?;
    if let Some(index) = args.index {
        config.index_directory = Some(index);
    }
    let api = SearchApi::open(config)?;
    let index = api.index();
    println!("documents\t{}", index.num_docs());
    if let Some(term) = args.term {
        println!("{}:{}\t{}", args.field, term, index.doc_freq(&args.field, &term.to_lowercase())?);
    }
    Ok(())
}
