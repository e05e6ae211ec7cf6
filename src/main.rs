use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shortflix::backdrop::{Field, Point};
use shortflix::client::{prepare_new_clip, ApiClient};
use shortflix::config::{AppPaths, Settings};
use shortflix::errors::{Result, SfError};
use shortflix::server::{self, AppState};
use shortflix::storage::models::{CatalogStats, Clip, ClipQuery};

const DEFAULT_LOG_FILTER: &str = "shortflix=info,tower_http=info";
const FRAME_MS: f64 = 16.0;

#[derive(Parser)]
#[command(name = "shortflix", version, about = "A short-video catalog with a JSON API")]
struct Cli {
    /// Output results as JSON
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Base URL of a running shortflix server
    #[arg(long = "url", alias = "api-url", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3000
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// List clips, newest first
    List {
        /// Case-insensitive search over titles and tags
        #[arg(short, long)]
        q: Option<String>,

        /// Only clips carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Page size (1-100)
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Search titles and tags
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Add a clip
    Add {
        /// http(s) URL of the video
        video_url: String,

        /// Clip title
        title: String,

        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },

    /// Show catalog statistics
    Stats,

    /// Run the particle-net background headless and print the last frame
    Backdrop {
        #[arg(long, default_value = "1280")]
        width: f64,

        #[arg(long, default_value = "720")]
        height: f64,

        /// Frames to simulate
        #[arg(short, long, default_value = "120")]
        frames: u32,

        /// RNG seed for a reproducible layout
        #[arg(short, long)]
        seed: Option<u64>,

        /// Pointer position as X,Y
        #[arg(short, long)]
        pointer: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            eprintln!("{}", serde_json::json!({"error": e.to_string()}));
        } else {
            eprintln!("error: {}", e);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::new();
    let mut settings = Settings::load(&paths)?;
    if let Some(url) = cli.api_url {
        settings.api_url = url;
    }
    let json = cli.json;

    match cli.command {
        None => cmd_list(&settings, ClipQuery::default(), json),
        Some(Commands::Serve { addr }) => {
            if let Some(addr) = addr {
                settings.bind_addr = addr;
            }
            cmd_serve(&settings)
        }
        Some(Commands::List {
            q,
            tag,
            page,
            limit,
        }) => cmd_list(
            &settings,
            ClipQuery {
                q,
                tag,
                page,
                limit,
            },
            json,
        ),
        Some(Commands::Search { query, limit }) => cmd_list(
            &settings,
            ClipQuery {
                q: Some(query),
                limit,
                ..Default::default()
            },
            json,
        ),
        Some(Commands::Add {
            video_url,
            title,
            tags,
        }) => cmd_add(&settings, &video_url, &title, &tags, json),
        Some(Commands::Stats) => cmd_stats(&settings, json),
        Some(Commands::Backdrop {
            width,
            height,
            frames,
            seed,
            pointer,
        }) => cmd_backdrop(width, height, frames, seed, pointer.as_deref(), json),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_serve(settings: &Settings) -> Result<()> {
    init_logging();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let state = Arc::new(AppState::default());
    runtime.block_on(server::serve(&settings.bind_addr, state))
}

fn cmd_list(settings: &Settings, query: ClipQuery, json: bool) -> Result<()> {
    let client = ApiClient::new(&settings.api_url)?;
    let clips = client.list(&query)?;

    if json {
        println!("{}", serde_json::to_string(&clips)?);
        return Ok(());
    }

    if clips.is_empty() {
        match query.q {
            Some(q) => println!("No results for \"{}\".", q),
            None => println!("No clips found."),
        }
        return Ok(());
    }

    for clip in &clips {
        print_clip_row(clip);
    }
    Ok(())
}

fn cmd_add(
    settings: &Settings,
    video_url: &str,
    title: &str,
    tags: &str,
    json: bool,
) -> Result<()> {
    let new_clip = prepare_new_clip(video_url, title, tags)?;
    let client = ApiClient::new(&settings.api_url)?;
    let clip = client.add(&new_clip)?;

    if json {
        println!("{}", serde_json::to_string(&clip)?);
    } else {
        println!("Added clip #{}.", clip.id);
        print_clip_row(&clip);
    }
    Ok(())
}

fn cmd_stats(settings: &Settings, json: bool) -> Result<()> {
    let client = ApiClient::new(&settings.api_url)?;
    let stats = client.stats()?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    print_stats(&stats);
    Ok(())
}

fn cmd_backdrop(
    width: f64,
    height: f64,
    frames: u32,
    seed: Option<u64>,
    pointer: Option<&str>,
    json: bool,
) -> Result<()> {
    check_viewport(width, height)?;
    let pointer = pointer.map(parse_point).transpose()?;
    let mut field = match seed {
        Some(seed) => Field::new(width, height, seed),
        None => Field::from_entropy(width, height),
    };
    for i in 0..frames {
        field.step(f64::from(i) * FRAME_MS, pointer);
    }
    let frame = field.frame(pointer);

    if json {
        println!("{}", serde_json::to_string(&frame)?);
        return Ok(());
    }

    println!(
        "{}x{} after {} frames: {} nodes, {} links",
        frame.width,
        frame.height,
        frames,
        frame.nodes.len(),
        frame.links.len()
    );
    for (i, (node, glow)) in frame.nodes.iter().zip(&frame.glows).enumerate() {
        println!(
            "{:>3} {:>8.1} {:>8.1}  r={:.2} a={:.2}",
            i, node.x, node.y, glow.radius, glow.alpha
        );
    }
    Ok(())
}

fn check_viewport(width: f64, height: f64) -> Result<()> {
    if !width.is_finite() || !height.is_finite() {
        return Err(SfError::invalid(format!(
            "viewport must be finite: {}x{}",
            width, height
        )));
    }
    Ok(())
}

fn parse_point(raw: &str) -> Result<Point> {
    let invalid = || SfError::invalid(format!("pointer must be X,Y: {:?}", raw));
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<f64>().map_err(|_| invalid())?;
    let y = y.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok(Point::new(x, y))
}

fn print_clip_row(clip: &Clip) {
    let title = if clip.title.chars().count() > 40 {
        format!("{}...", clip.title.chars().take(37).collect::<String>())
    } else {
        clip.title.clone()
    };
    let tags = if clip.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", clip.tags.join(", "))
    };

    println!("{:>4} {:<40}{}  {}", clip.id, title, tags, clip.video_url);
}

fn print_stats(stats: &CatalogStats) {
    println!("Catalog Statistics");
    println!("──────────────────");
    println!("Total clips:  {}", stats.total_clips);
    println!("Tags:         {}", stats.distinct_tags);
    for tag in stats.tags.iter().take(10) {
        println!("  {:<12}{}", tag.tag, tag.count);
    }
    if let Some(oldest) = stats.oldest {
        println!("Oldest:       {}", oldest.format("%Y-%m-%d %H:%M"));
    }
    if let Some(newest) = stats.newest {
        println!("Newest:       {}", newest.format("%Y-%m-%d %H:%M"));
    }
}
