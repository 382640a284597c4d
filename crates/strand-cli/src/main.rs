use std::fs;
use std::io::{self, BufRead as _, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use strand_contracts::models::{ModelRegistry, CAP_IMAGE, CAP_STRUCTURED, CAP_VIDEO};
use strand_contracts::{ConsultancyKind, ConsultancyRequest, EventLog, MediaPart};
use strand_engine::{
    DryrunBackend, GeminiBackend, GenerativeBackend, ModelPlan, Studio, VideoRequest,
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "strand", version, about = "Strand salon studio CLI")]
struct Cli {
    /// Use the offline deterministic backend instead of the hosted endpoint.
    #[arg(long, global = true)]
    dry_run: bool,
    /// Event log path (JSONL). Defaults to strand-events.jsonl in the
    /// working directory.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Consult(ConsultArgs),
    Edit(EditArgs),
    Look(LookArgs),
    Video(VideoArgs),
    Trends(TrendsArgs),
    Places(PlacesArgs),
    Tip,
    Chat,
}

#[derive(Debug, Parser)]
struct ConsultArgs {
    /// Consultancy kind: face, color, haircut, look or therapy.
    #[arg(long)]
    kind: String,
    /// Client photo (jpeg, png or webp).
    #[arg(long)]
    subject: PathBuf,
    /// Optional reference photo.
    #[arg(long)]
    reference: Option<PathBuf>,
    /// The client's stated goal, verbatim.
    #[arg(long, default_value = "")]
    text: String,
    /// Product brand woven into the report.
    #[arg(long)]
    brand: Option<String>,
    /// Spend a larger reasoning budget (face analysis only).
    #[arg(long)]
    deep: bool,
    /// Override the consultancy model.
    #[arg(long)]
    model: Option<String>,
    /// Write the report JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct EditArgs {
    #[arg(long)]
    subject: PathBuf,
    /// The visual change to apply, e.g. "platinum blonde bob".
    #[arg(long)]
    instruction: String,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct LookArgs {
    #[arg(long)]
    subject: PathBuf,
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Inspiration for the look, e.g. "90s grunge, autumn palette".
    #[arg(long, default_value = "")]
    text: String,
    #[arg(long)]
    out: PathBuf,
    /// Also write the intermediate prompt here.
    #[arg(long)]
    prompt_out: Option<PathBuf>,
}

#[derive(Debug, Parser)]
struct VideoArgs {
    #[arg(long)]
    prompt: String,
    /// Optional still to animate.
    #[arg(long)]
    seed_image: Option<PathBuf>,
    #[arg(long, default_value_t = 10.0)]
    poll_interval: f64,
    #[arg(long, default_value_t = 600.0)]
    poll_timeout: f64,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct TrendsArgs {
    #[arg(long)]
    query: String,
}

#[derive(Debug, Parser)]
struct PlacesArgs {
    #[arg(long)]
    query: String,
    #[arg(long)]
    lat: f64,
    #[arg(long)]
    lng: f64,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("strand error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let model_override = match &cli.command {
        Command::Consult(args) => args.model.clone().map(|name| (name, CAP_STRUCTURED)),
        Command::Edit(args) => args.model.clone().map(|name| (name, CAP_IMAGE)),
        Command::Video(args) => args.model.clone().map(|name| (name, CAP_VIDEO)),
        _ => None,
    };
    let studio = build_studio(cli.dry_run, cli.events.clone(), model_override)?;
    match cli.command {
        Command::Consult(args) => run_consult(&studio, args),
        Command::Edit(args) => run_edit(&studio, args),
        Command::Look(args) => run_look(&studio, args),
        Command::Video(args) => run_video(&studio, args),
        Command::Trends(args) => run_trends(&studio, args),
        Command::Places(args) => run_places(&studio, args),
        Command::Tip => run_tip(&studio),
        Command::Chat => run_chat(&studio),
    }
}

fn build_studio(
    dry_run: bool,
    events: Option<PathBuf>,
    model_override: Option<(String, &'static str)>,
) -> Result<Studio> {
    let session_id = Uuid::new_v4().to_string();
    let events_path = events.unwrap_or_else(|| PathBuf::from("strand-events.jsonl"));
    let events = EventLog::new(events_path, session_id);

    let backend: Box<dyn GenerativeBackend> = if dry_run {
        Box::new(DryrunBackend::new())
    } else {
        Box::new(GeminiBackend::from_env()?)
    };
    let registry = ModelRegistry::default();
    let mut models = ModelPlan::from_registry(&registry)
        .map_err(|err| err.context("model registry resolution failed"))?;
    if let Some((name, capability)) = model_override {
        let model = registry
            .resolve(Some(&name), capability)
            .map_err(|err| anyhow::anyhow!(err))?;
        match capability {
            CAP_IMAGE => models.edit = model.name,
            CAP_VIDEO => models.video = model.name,
            _ => models.consult = model.name,
        }
    }
    Ok(Studio::with_models(backend, events, models))
}

fn run_consult(studio: &Studio, args: ConsultArgs) -> Result<i32> {
    let kind: ConsultancyKind = args
        .kind
        .parse()
        .map_err(|err: String| anyhow::anyhow!(err))?;
    let mut request = ConsultancyRequest::new(kind, load_image(&args.subject)?)
        .with_free_text(args.text)
        .with_deep_analysis(args.deep);
    if let Some(reference) = &args.reference {
        request = request.with_reference(load_image(reference)?);
    }
    if let Some(brand) = args.brand {
        request = request.with_brand(brand);
    }

    let report = studio.consult(&request)?;
    let rendered = serde_json::to_string_pretty(&report)?;
    match args.out {
        Some(path) => {
            fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(0)
}

fn run_edit(studio: &Studio, args: EditArgs) -> Result<i32> {
    let subject = load_image(&args.subject)?;
    let edited = studio.edit_image(&subject, &args.instruction)?;
    write_media(&args.out, &edited)?;
    println!("Edited image written to {}", args.out.display());
    Ok(0)
}

fn run_look(studio: &Studio, args: LookArgs) -> Result<i32> {
    let subject = load_image(&args.subject)?;
    let mut request = ConsultancyRequest::new(ConsultancyKind::Look, subject.clone())
        .with_free_text(args.text);
    if let Some(reference) = &args.reference {
        request = request.with_reference(load_image(reference)?);
    }

    // Two independent calls: the prompt consultancy first, the render only
    // if it succeeded.
    let report = studio.consult(&request)?;
    let prompt = report
        .as_look()
        .map(|look| look.prompt.clone())
        .context("consultancy returned a non-look report")?;
    if let Some(path) = &args.prompt_out {
        fs::write(path, &prompt).with_context(|| format!("writing {}", path.display()))?;
    }

    let rendered = studio.generate_look_image(&subject, &prompt)?;
    write_media(&args.out, &rendered)?;
    println!("Look image written to {}", args.out.display());
    Ok(0)
}

fn run_video(studio: &Studio, args: VideoArgs) -> Result<i32> {
    let mut request = VideoRequest::new(args.prompt)
        .with_polling(args.poll_interval, args.poll_timeout);
    if let Some(seed) = &args.seed_image {
        request = request.with_seed_image(load_image(seed)?);
    }
    let result = studio.generate_video(&request)?;
    fs::write(&args.out, &result.bytes)
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!(
        "Video written to {} ({} bytes, {} polls)",
        args.out.display(),
        result.bytes.len(),
        result.polls
    );
    Ok(0)
}

fn run_trends(studio: &Studio, args: TrendsArgs) -> Result<i32> {
    let answer = studio.search_trends(&args.query)?;
    println!("{}", answer.text);
    print_sources(&answer.chunks);
    Ok(0)
}

fn run_places(studio: &Studio, args: PlacesArgs) -> Result<i32> {
    let answer = studio.search_places(&args.query, args.lat, args.lng)?;
    println!("{}", answer.text);
    print_sources(&answer.chunks);
    Ok(0)
}

fn run_tip(studio: &Studio) -> Result<i32> {
    println!("{}", studio.quick_tip()?);
    Ok(0)
}

fn run_chat(studio: &Studio) -> Result<i32> {
    let mut chat = studio.start_chat();
    let stdin = io::stdin();
    println!("Strand assistant ready. Empty line or Ctrl-D to leave.");
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            break;
        }
        match chat.send(message) {
            Ok(reply) => println!("{reply}"),
            Err(err) => eprintln!("strand error: {err:#}"),
        }
    }
    Ok(0)
}

fn print_sources(chunks: &[strand_engine::GroundingChunk]) {
    if chunks.is_empty() {
        return;
    }
    println!("\nSources:");
    for chunk in chunks {
        let title = chunk.title.as_deref().unwrap_or("(untitled)");
        match chunk.uri.as_deref() {
            Some(uri) => println!("  - {title}: {uri}"),
            None => println!("  - {title}"),
        }
    }
}

fn load_image(path: &Path) -> Result<MediaPart> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mime_type = mime_for_path(path)?;
    Ok(MediaPart::from_bytes(mime_type, &bytes)?)
}

fn mime_for_path(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        other => bail!("unsupported image extension '{other}' ({})", path.display()),
    }
}

fn write_media(path: &Path, part: &MediaPart) -> Result<()> {
    let bytes = part.decode()?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{mime_for_path, Cli};
    use clap::Parser as _;

    #[test]
    fn mime_detection_covers_accepted_extensions() {
        assert_eq!(mime_for_path(Path::new("a.JPG")).unwrap(), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.png")).unwrap(), "image/png");
        assert_eq!(mime_for_path(Path::new("a.webp")).unwrap(), "image/webp");
        assert!(mime_for_path(Path::new("a.gif")).is_err());
        assert!(mime_for_path(Path::new("noext")).is_err());
    }

    #[test]
    fn consult_args_parse() {
        let cli = Cli::parse_from([
            "strand",
            "--dry-run",
            "consult",
            "--kind",
            "color",
            "--subject",
            "client.jpg",
            "--text",
            "pearl blonde",
            "--brand",
            "Wella Professionals",
        ]);
        assert!(cli.dry_run);
        match cli.command {
            super::Command::Consult(args) => {
                assert_eq!(args.kind, "color");
                assert_eq!(args.brand.as_deref(), Some("Wella Professionals"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn video_args_default_polling() {
        let cli = Cli::parse_from([
            "strand", "video", "--prompt", "pan", "--out", "v.mp4",
        ]);
        match cli.command {
            super::Command::Video(args) => {
                assert_eq!(args.poll_interval, 10.0);
                assert_eq!(args.poll_timeout, 600.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
