//! inkslide CLI - layered Inkscape drawings to slide decks
//!
//! Renders one page per line of the drawing's `content` layer and joins the
//! pages into a single document.

mod logging;

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use inkslide::{SlideMaker, SlideOptions, SlidePlan, SlideRun};
use std::path::PathBuf;

/// Turn a layered Inkscape drawing into a slide deck
#[derive(Parser)]
#[command(
    name = "inkslide",
    version,
    about = "Build slide decks from layered Inkscape drawings",
    long_about = "inkslide - build slide decks from a single layered Inkscape drawing.\n\n\
                  Create a layer labeled 'content' holding a text box with one line per slide.\n\
                  Each line lists the layers shown on that slide, e.g. 'background, title'.\n\
                  A line starting with '+' adds to the previous slide; 'layer*0.5' sets opacity."
)]
struct Cli {
    /// Layered SVG drawing
    svg: PathBuf,

    /// Render PNG pages and combine them with ImageMagick
    #[arg(short = 'i', long = "imageexport")]
    image_export: bool,

    /// Keep the individual pages instead of joining them
    #[arg(short = 'J', long = "nojoin")]
    no_join: bool,

    /// Joined output file (default: the drawing's name with .pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PNG export resolution
    #[arg(long, default_value = "180")]
    dpi: u32,

    /// Date shown by {{#DATE#}} fields (default: now)
    #[arg(long)]
    date: Option<String>,

    /// Format of --date
    #[arg(long, default_value = "%Y-%m-%d")]
    date_format: String,

    /// Inkscape executable
    #[arg(long, default_value = "inkscape")]
    inkscape: PathBuf,

    /// Use the Inkscape 0.x command line
    #[arg(long)]
    legacy_inkscape: bool,

    /// Print the compiled slide plan without rendering
    #[arg(long)]
    dry_run: bool,

    /// Print the plan or the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> SlideOptions {
        let mut options = SlideOptions::new()
            .with_image_export(self.image_export)
            .with_join(!self.no_join)
            .with_dpi(self.dpi)
            .with_inkscape(&self.inkscape, self.legacy_inkscape)
            .with_date_format(&self.date_format);
        if let Some(output) = &self.output {
            options = options.with_output(output);
        }
        if let Some(date) = &self.date {
            options = options.with_date(date);
        }
        options
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests print to stdout and are not failures.
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut maker = SlideMaker::open(&cli.svg, cli.options())?;

    if cli.dry_run {
        print_plan(maker.plan(), cli.json)?;
        return Ok(());
    }

    let pb = create_progress_bar(maker.plan().len() as u64);
    let result = maker.build(|rendered| {
        pb.set_message(rendered.path.display().to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();
    let run = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&run);
    }
    Ok(())
}

fn print_plan(plan: &SlidePlan, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    println!("{}", "Slide Plan".cyan().bold());
    println!("{}", "─".repeat(40));
    for (i, slide) in plan.iter().enumerate() {
        println!("{:>4}: {}", (i + 1).to_string().bold(), slide);
    }
    Ok(())
}

fn print_summary(run: &SlideRun) {
    println!(
        "{} Generated {} pages",
        "✓".green().bold(),
        run.pages.len()
    );

    if let Some(output) = &run.output {
        println!(
            "{} Joined with {}: {}",
            "✓".green().bold(),
            run.joiner.as_deref().unwrap_or("?"),
            output.display()
        );
    } else if let Some(error) = &run.join_error {
        println!("{} {}", "!".yellow().bold(), error);
        println!(
            "{} Pages kept in {}",
            "!".yellow().bold(),
            pages_dir(run).display()
        );
    } else {
        for page in &run.pages {
            println!("  {}", page.display());
        }
    }
}

fn pages_dir(run: &SlideRun) -> PathBuf {
    run.pages
        .first()
        .and_then(|page| page.parent())
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.set_message("Rendering slides...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
