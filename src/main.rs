use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::warn;

use statejobs_matcher::applications::APPLICATIONS_CSV;
use statejobs_matcher::config::Config;
use statejobs_matcher::documents::{self, GenerationOutcome, GenerationRun, Templates};
use statejobs_matcher::llm::OpenAiClient;
use statejobs_matcher::matching::{infer_profile, match_catalog};
use statejobs_matcher::scrape::HttpClient;
use statejobs_matcher::store::{self, FILTERED_JOBS, JOB_DETAILS, RESUME_MATCHES};
use statejobs_matcher::{dashboard, resume, telemetry};
use statejobs_matcher::{CandidateProfile, DetailRecord, JobCatalog, JobListing, MatchLevel, MatchResult};

#[derive(Parser, Debug)]
#[command(
    name = "statejobs-matcher",
    about = "Scrape NY state job vacancies, match them against your resume and draft applications",
    version
)]
struct Cli {
    /// Directory for saved JSON files and the application log (overrides JOBS_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the vacancy table, filter by county and scrape job details
    Scrape(ScrapeArgs),
    /// Classify scraped jobs against a resume
    Match(MatchArgs),
    /// Generate cover letters, tailored resumes and application steps
    Generate(GenerateArgs),
    /// Browse generated applications
    Dashboard,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Keep only jobs in this county (repeatable; none means all counties)
    #[arg(long = "county")]
    counties: Vec<String>,
    /// Print the counties present in the vacancy table and stop
    #[arg(long)]
    list_counties: bool,
    /// Save the filtered listing without visiting detail pages
    #[arg(long)]
    skip_details: bool,
    /// Vacancy table URL (overrides JOBS_VACANCY_URL)
    #[arg(long)]
    url: Option<String>,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Resume to match with (.pdf or text)
    #[arg(long)]
    resume: PathBuf,
    /// job_details_*.json to read (defaults to the newest in the data dir)
    #[arg(long)]
    details: Option<PathBuf>,
    /// filtered_jobs_*.json to read agencies from (defaults to the newest)
    #[arg(long)]
    filtered: Option<PathBuf>,
    /// Candidate domain; skips inference when given with --salary
    #[arg(long, requires = "salary")]
    domain: Option<String>,
    /// Candidate salary range; skips inference when given with --domain
    #[arg(long, requires = "domain")]
    salary: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LevelArg {
    Good,
    Minimum,
}

impl From<LevelArg> for MatchLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Good => MatchLevel::Good,
            LevelArg::Minimum => MatchLevel::Minimum,
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Original resume (.pdf or text)
    #[arg(long)]
    resume: PathBuf,
    /// Generate for this item number (repeatable)
    #[arg(long = "item")]
    items: Vec<String>,
    /// Generate for every match at this level
    #[arg(long, value_enum)]
    level: Option<LevelArg>,
    /// Extra notes passed to every prompt
    #[arg(long, default_value = "")]
    notes: String,
    /// resume_matches_*.json to read (defaults to the newest)
    #[arg(long)]
    matches: Option<PathBuf>,
    /// job_details_*.json to read (defaults to the newest)
    #[arg(long)]
    details: Option<PathBuf>,
    /// filtered_jobs_*.json to read agencies from (defaults to the newest)
    #[arg(long)]
    filtered: Option<PathBuf>,
    #[arg(long, default_value = "cover_letter_template.txt")]
    cover_letter_template: PathBuf,
    #[arg(long, default_value = "resume_template.txt")]
    resume_template: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    telemetry::init(&config.log_level)?;

    match cli.command {
        Command::Scrape(args) => run_scrape(&config, args),
        Command::Match(args) => run_match(&config, args),
        Command::Generate(args) => run_generate(&config, args),
        Command::Dashboard => {
            println!("Launching dashboard...");
            dashboard::run_dashboard(&config.data_dir.join(APPLICATIONS_CSV))
        }
    }
}

fn run_scrape(config: &Config, args: ScrapeArgs) -> anyhow::Result<()> {
    let client = HttpClient::new(config.http_timeout)?;
    let url = args.url.as_deref().unwrap_or(&config.vacancy_url);
    let mut catalog = JobCatalog::new();

    println!("Scraping vacancy table...");
    let total = catalog
        .refresh_listings(&client, url)
        .context("Error fetching the vacancy table")?;
    println!("Scraped {total} jobs successfully!");

    if args.list_counties {
        for county in catalog.available_counties() {
            println!("{county}");
        }
        return Ok(());
    }

    let wanted: BTreeSet<String> = args.counties.into_iter().collect();
    let known: BTreeSet<String> = catalog.available_counties().into_iter().collect();
    for county in wanted.difference(&known) {
        warn!("county '{county}' does not appear in the vacancy table");
    }
    catalog.set_county_filter(wanted);

    println!("Total Jobs: {}", catalog.listings().len());
    println!("Filtered Jobs: {}", catalog.filtered().len());

    if !args.skip_details {
        let summary = catalog.scrape_details(&client, &config.detail_url, |i, total, item| {
            println!("[{i}/{total}] Scraping job details for {item}");
        });
        println!(
            "Job details scraped: {} ok, {} failed",
            summary.scraped, summary.failed
        );
    }

    let saved = store::save_job_data(&config.data_dir, catalog.filtered(), &catalog.details_in_order())?;
    println!(
        "Saved filtered jobs to {} and details to {}",
        saved.filtered_jobs.display(),
        saved.job_details.display()
    );
    Ok(())
}

/// Resolves an explicit path or the newest saved blob of that kind.
fn blob_path(explicit: Option<PathBuf>, dir: &Path, prefix: &str) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(store::latest(dir, prefix)?),
    }
}

/// Rebuilds the catalog from saved details plus, if available, the filtered
/// listing they came from.
fn load_catalog(
    dir: &Path,
    details: Option<PathBuf>,
    filtered: Option<PathBuf>,
) -> anyhow::Result<JobCatalog> {
    let details_path = blob_path(details, dir, JOB_DETAILS)?;
    let details: BTreeMap<String, DetailRecord> = store::load_json(&details_path)?;

    let listings: Vec<JobListing> = match blob_path(filtered, dir, FILTERED_JOBS) {
        Ok(path) => store::load_json(&path)?,
        Err(e) => {
            warn!("no filtered job listing available, agencies will be blank: {e}");
            Vec::new()
        }
    };

    println!("Loaded {} job details from {}", details.len(), details_path.display());
    Ok(JobCatalog::restore(listings, details))
}

fn run_match(config: &Config, args: MatchArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(&config.data_dir, args.details, args.filtered)?;
    if catalog.details().is_empty() {
        anyhow::bail!("No job details available. Run `scrape` first.");
    }

    let resume_text = resume::load_resume_text(&args.resume)?;
    let model = OpenAiClient::new(config.openai_api_key.clone(), config.openai_model.clone())?;

    let profile = match (args.domain, args.salary) {
        (Some(candidate_domain), Some(candidate_salary_range)) => CandidateProfile {
            candidate_domain,
            candidate_salary_range,
        },
        _ => {
            println!("Analyzing resume for domain & salary...");
            infer_profile(&model, &resume_text).context("Error inferring domain and salary range")?
        }
    };
    if !profile.is_complete() {
        anyhow::bail!("Could not determine candidate domain and salary range; pass --domain and --salary");
    }
    println!("Candidate Domain: {}", profile.candidate_domain);
    println!("Candidate Salary Range: {}", profile.candidate_salary_range);

    let results = match_catalog(&model, &profile, &resume_text, &catalog, |i, total| {
        println!("Processing job {i} of {total}...");
    });

    for r in &results {
        println!("{} (Item {}): {}", r.job_title, r.item_number, r.resume_match_level);
        println!("    {}", r.match_explanation);
    }

    let path = store::save_matches(&config.data_dir, &results)?;
    println!("Saved resume match results to {}", path.display());
    Ok(())
}

fn run_generate(config: &Config, args: GenerateArgs) -> anyhow::Result<()> {
    let matches_path = blob_path(args.matches, &config.data_dir, RESUME_MATCHES)?;
    let matches: Vec<MatchResult> = store::load_json(&matches_path)?;
    if !matches.iter().any(|m| m.resume_match_level.is_applicable()) {
        println!("No applicable jobs found from your matches.");
        return Ok(());
    }

    let selected = documents::select_matches(&matches, &args.items, args.level.map(MatchLevel::from));
    if selected.is_empty() {
        println!("No jobs selected for document generation. Use --item or --level.");
        return Ok(());
    }

    let catalog = load_catalog(&config.data_dir, args.details, args.filtered)?;
    let templates = Templates::load(&args.cover_letter_template, &args.resume_template)?;
    let resume_text = resume::load_resume_text(&args.resume)?;
    let model = OpenAiClient::new(config.openai_api_key.clone(), config.openai_model.clone())?;

    let output_dir = config.data_dir.join(documents::OUTPUT_DIR);
    let applications_csv = config.data_dir.join(APPLICATIONS_CSV);
    let run = GenerationRun {
        catalog: &catalog,
        resume_text: &resume_text,
        notes: &args.notes,
        templates: &templates,
        output_dir: &output_dir,
        applications_csv: &applications_csv,
    };

    for outcome in documents::generate_for_matches(&model, &run, &selected) {
        match outcome {
            GenerationOutcome::Generated { item_number, docs, paths } => {
                println!("Documents generated for job {item_number}!");
                println!("  Cover letter: {}", paths.cover_letter.display());
                println!("  Resume:       {}", paths.resume.display());
                println!("  Instructions: {}", paths.instructions.display());
                println!("Explanation of Resume Changes:\n{}\n", docs.resume_changes);
            }
            GenerationOutcome::Skipped { item_number, reason } => {
                println!("Skipped job {item_number}: {reason}");
            }
        }
    }

    println!("Check the '{}' folder for the output files.", output_dir.display());
    Ok(())
}
