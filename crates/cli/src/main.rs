use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use generation::{GenerationConfig, GenerationService};
use project::{
    builtin_templates, find_template, AssetRemoval, AssetType, NewProject, Project, ProjectPatch,
    ProjectStore, SqliteSlot,
};
use search::SearchCriteria;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studio::panels::{
    AnimatePanel, ArtStyle, AssetsPanel, CharacterPanel, CharacterSpec, DirectorPanel, DrawingPanel,
    GeneratePanel, SceneEditor, SearchPanel, SequencePanel, StoryPanel, Storyboarder,
};
use studio::{MediaFile, Studio};
use timeline::{format_clock, time_ruler, SceneLayout};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studio-cli")]
#[command(about = "AI animation studio CLI - headless project and generation operations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the project database and config.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Answer generation requests locally with placeholder content
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect and delete projects
    #[command(subcommand)]
    Projects(ProjectCommand),

    /// Built-in starter projects
    #[command(subcommand)]
    Templates(TemplateCommand),

    /// Edit a project's scene list
    #[command(subcommand)]
    Scenes(SceneCommand),

    /// Manage the asset library
    #[command(subcommand)]
    Assets(AssetCommand),

    /// Rank library assets against a query or explicit criteria
    Search(SearchArgs),

    /// Run a generation panel
    #[command(subcommand)]
    Generate(GenerateCommand),
}

#[derive(Subcommand)]
enum ProjectCommand {
    List,
    New {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    Show {
        project: String,
    },
    Rename {
        project: String,
        name: String,
    },
    Delete {
        project: String,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    List,
    /// Create a project from a template
    Use {
        template: String,
        /// Project name (defaults to "<template> Copy")
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum SceneCommand {
    List {
        project: String,
    },
    Add {
        project: String,
        /// Scene script
        #[arg(short, long)]
        script: Option<String>,
        /// Duration in seconds
        #[arg(short, long)]
        duration: Option<f64>,
    },
    Delete {
        project: String,
        scene: String,
    },
    /// Print scene start offsets and the time ruler
    Timeline {
        project: String,
    },
}

#[derive(Subcommand)]
enum AssetCommand {
    /// Import local files; images are analyzed and tagged
    Import {
        project: String,
        files: Vec<PathBuf>,
    },
    List {
        project: String,
        #[arg(long = "type")]
        asset_type: Option<String>,
    },
    /// Filter by name, tags and analysis text
    Filter {
        project: String,
        #[arg(default_value = "")]
        term: String,
        #[arg(long = "type")]
        asset_type: Option<String>,
        #[arg(long)]
        style: Option<String>,
    },
    Remove {
        project: String,
        asset: String,
        /// Clear every reference to the asset instead of refusing
        #[arg(long)]
        detach: bool,
    },
}

#[derive(Args)]
struct SearchArgs {
    project: String,
    /// Free-text query interpreted by the content model
    query: Option<String>,
    #[arg(long = "type", value_delimiter = ',')]
    asset_types: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    descriptors: Vec<String>,
    #[arg(long)]
    context: Option<String>,
    #[arg(long)]
    mood: Option<String>,
    #[arg(long, value_delimiter = ',')]
    colors: Vec<String>,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Storyboard panels for one scene
    Storyboard { project: String, scene: String },
    /// Shot list with artwork, appended as scenes
    Sequence {
        project: String,
        /// Script text (defaults to the project script)
        #[arg(short, long)]
        script: Option<String>,
        /// Print the shots without adding scenes
        #[arg(long)]
        dry_run: bool,
    },
    /// Split a script into scenes
    Breakdown {
        project: String,
        #[arg(short, long)]
        script: Option<String>,
    },
    /// Text to image asset
    Image { project: String, prompt: String },
    /// Character sheet and expressions, saved as a character asset
    Character {
        project: String,
        description: String,
        #[arg(long, default_value = "Cartoon")]
        style: String,
    },
    /// Image to video clip in a new scene
    Animate {
        project: String,
        image: PathBuf,
        #[arg(short, long, default_value = "")]
        prompt: String,
        /// Clip length in seconds when known
        #[arg(long)]
        seconds: Option<f64>,
    },
    /// Director's analysis of a scene
    Direct {
        project: String,
        scene: String,
        /// Apply the suggested camera movement and duration
        #[arg(long)]
        apply: bool,
    },
    /// Describe an image's art style, optionally saving it as a profile
    Style {
        image: PathBuf,
        #[arg(long)]
        project: Option<String>,
        #[arg(long, requires = "project")]
        save_as: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let data_dir = cli.data_dir.clone().unwrap_or_else(project::app_data_dir);
    let store = Arc::new(open_store(&data_dir)?);

    match cli.command {
        Commands::Projects(cmd) => projects_command(&store, cmd),
        Commands::Templates(cmd) => templates_command(&store, cmd),
        Commands::Scenes(cmd) => scenes_command(&store, cmd),
        Commands::Assets(cmd) => {
            let studio = open_studio(store, &data_dir, cli.offline)?;
            assets_command(&studio, cmd).await
        }
        Commands::Search(args) => {
            let studio = open_studio(store, &data_dir, cli.offline)?;
            search_command(&studio, args).await
        }
        Commands::Generate(cmd) => {
            let studio = open_studio(store, &data_dir, cli.offline)?;
            generate_command(&studio, cmd).await
        }
    }
}

fn open_store(data_dir: &Path) -> Result<ProjectStore> {
    let db_path = data_dir.join("studio.sqlite3");
    let slot = SqliteSlot::open_or_create(&db_path)
        .with_context(|| format!("opening project database {}", db_path.display()))?;
    debug!(db = %db_path.display(), "project store opened");
    Ok(ProjectStore::open(slot))
}

/// `config.json` in the data dir when present, then environment overrides.
fn load_config(data_dir: &Path) -> Result<GenerationConfig> {
    let path = data_dir.join("config.json");
    let mut config = if path.exists() {
        GenerationConfig::load(&path)?
    } else {
        GenerationConfig::default()
    };
    config.apply_env();
    Ok(config)
}

fn open_studio(store: Arc<ProjectStore>, data_dir: &Path, offline: bool) -> Result<Studio> {
    let config = load_config(data_dir)?;
    let generation = if offline {
        warn!("offline mode: generated content is placeholder data");
        GenerationService::offline(config)
    } else {
        config.validate().context("generation is not configured")?;
        GenerationService::gemini(config)?
    };
    Ok(Studio::new(store, generation))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_project(store: &ProjectStore, id: &str) -> Result<Project> {
    store.get(id).ok_or_else(|| anyhow!("project {id} not found"))
}

fn parse_asset_type(raw: Option<&str>) -> Result<Option<AssetType>> {
    raw.map(|t| t.parse::<AssetType>()).transpose().map_err(Into::into)
}

fn projects_command(store: &ProjectStore, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::List => {
            for project in store.list().iter() {
                println!(
                    "{}  {}  ({} scenes, {} assets, modified {})",
                    project.id,
                    project.name,
                    project.scenes.len(),
                    project.assets.len(),
                    project.last_modified.to_rfc3339()
                );
            }
            Ok(())
        }
        ProjectCommand::New { name, description } => {
            let mut details = NewProject::named(name);
            if let Some(description) = description {
                details = details.with_description(description);
            }
            let project = store.create(details, None)?;
            println!("{}", project.id);
            Ok(())
        }
        ProjectCommand::Show { project } => print_json(&require_project(store, &project)?),
        ProjectCommand::Rename { project, name } => {
            let patch = ProjectPatch {
                name: Some(name),
                ..ProjectPatch::default()
            };
            let updated = store.update(&project, patch)?;
            info!(id = %updated.id, name = %updated.name, "project renamed");
            Ok(())
        }
        ProjectCommand::Delete { project } => {
            if !store.delete(&project) {
                bail!("project {project} not found");
            }
            Ok(())
        }
    }
}

fn templates_command(store: &ProjectStore, cmd: TemplateCommand) -> Result<()> {
    match cmd {
        TemplateCommand::List => {
            for template in builtin_templates() {
                println!("{:<20} {}  {}", template.id, template.name, template.description);
            }
            Ok(())
        }
        TemplateCommand::Use { template, name } => {
            let template = find_template(&template).ok_or_else(|| anyhow!("unknown template {template}"))?;
            let name = name.unwrap_or_else(|| template.suggested_name());
            let project = store.create(NewProject::named(name), Some(template.project_data))?;
            println!("{}", project.id);
            Ok(())
        }
    }
}

fn scenes_command(store: &Arc<ProjectStore>, cmd: SceneCommand) -> Result<()> {
    // Scene edits never reach the generative service.
    let editor = SceneEditor::new(Studio::new(
        store.clone(),
        GenerationService::offline(GenerationConfig::default()),
    ));
    match cmd {
        SceneCommand::List { project } => {
            let project = require_project(store, &project)?;
            for scene in &project.scenes {
                let script: String = scene.script.chars().take(60).collect();
                println!("{:>3}  {}  {:>6.2}s  {}", scene.number, scene.id, scene.duration, script);
            }
            Ok(())
        }
        SceneCommand::Add {
            project,
            script,
            duration,
        } => {
            let scene = editor.add_scene(&project)?;
            if let Some(script) = script {
                editor.set_script(&project, &scene.id, &script)?;
            }
            if let Some(duration) = duration {
                editor.set_duration(&project, &scene.id, duration)?;
            }
            println!("{}", scene.id);
            Ok(())
        }
        SceneCommand::Delete { project, scene } => {
            editor.delete_scene(&project, &scene)?;
            Ok(())
        }
        SceneCommand::Timeline { project } => {
            let project = require_project(store, &project)?;
            let layout = SceneLayout::compute(&project.scenes);
            for span in layout.spans() {
                println!(
                    "scene {:>3}  {:>7.2}s - {:>7.2}s  {}",
                    span.index + 1,
                    span.start,
                    span.end(),
                    span.id
                );
            }
            let labels: Vec<String> = time_ruler(layout.total_duration())
                .into_iter()
                .filter_map(|tick| tick.label)
                .collect();
            println!("ruler: {}", labels.join(" "));
            println!("{}", format_clock(0.0, layout.total_duration()));
            Ok(())
        }
    }
}

async fn assets_command(studio: &Studio, cmd: AssetCommand) -> Result<()> {
    let panel = AssetsPanel::new(studio.clone());
    match cmd {
        AssetCommand::Import { project, files } => {
            info!("Importing {} files into project {}", files.len(), project);
            for file in &files {
                if !file.exists() {
                    warn!("File does not exist: {:?}", file);
                    continue;
                }
                let asset = panel
                    .import_path(&project, file)
                    .await
                    .with_context(|| format!("importing {}", file.display()))?;
                println!("{}  {}  {}", asset.id, asset.asset_type, asset.name);
            }
            Ok(())
        }
        AssetCommand::List { project, asset_type } => {
            let assets = panel.list(&project, parse_asset_type(asset_type.as_deref())?)?;
            for asset in assets {
                println!("{}  {:<10}  {}", asset.id, asset.asset_type, asset.name);
            }
            Ok(())
        }
        AssetCommand::Filter {
            project,
            term,
            asset_type,
            style,
        } => {
            let assets = panel.filter(
                &project,
                &term,
                parse_asset_type(asset_type.as_deref())?,
                style.as_deref(),
            )?;
            for asset in assets {
                println!("{}  {:<10}  {}", asset.id, asset.asset_type, asset.name);
            }
            Ok(())
        }
        AssetCommand::Remove {
            project,
            asset,
            detach,
        } => {
            let policy = if detach { AssetRemoval::Detach } else { AssetRemoval::Reject };
            panel.remove(&project, &asset, policy)?;
            Ok(())
        }
    }
}

async fn search_command(studio: &Studio, args: SearchArgs) -> Result<()> {
    let panel = SearchPanel::new(studio.clone());
    let hits = match args.query {
        Some(query) => panel.search(&args.project, &query).await?,
        None => {
            let criteria = SearchCriteria {
                asset_types: args.asset_types,
                descriptors: args.descriptors,
                actions: Vec::new(),
                context: args.context.unwrap_or_default(),
                mood: args.mood.unwrap_or_default(),
                colors: args.colors,
            };
            if criteria == SearchCriteria::default() {
                bail!("give a query or at least one criteria flag");
            }
            panel.rank(&args.project, &criteria)?
        }
    };
    if hits.is_empty() {
        println!("No matching assets.");
    }
    for hit in hits {
        println!("{:>4}  {}  {}", hit.score, hit.asset.id, hit.asset.name);
        println!("      {}", hit.reasons.join("; "));
    }
    Ok(())
}

fn script_or_project(studio: &Studio, project_id: &str, script: Option<String>) -> Result<String> {
    match script {
        Some(script) => Ok(script),
        None => Ok(studio.project(project_id)?.script),
    }
}

async fn generate_command(studio: &Studio, cmd: GenerateCommand) -> Result<()> {
    match cmd {
        GenerateCommand::Storyboard { project, scene } => {
            let updated = Storyboarder::new(studio.clone()).generate(&project, &scene).await?;
            let panels = updated
                .scene(&scene)
                .map(|s| s.storyboard_panels.len())
                .unwrap_or_default();
            println!("{panels} storyboard panels generated");
            Ok(())
        }
        GenerateCommand::Sequence {
            project,
            script,
            dry_run,
        } => {
            let script = script_or_project(studio, &project, script)?;
            let panel = SequencePanel::new(studio.clone());
            if dry_run {
                return print_json(&panel.breakdown(&script).await?);
            }
            let shots = panel.generate(&project, &script).await?;
            let updated = panel.commit(&project, &shots)?;
            println!("{} shots added; project now has {} scenes", shots.len(), updated.scenes.len());
            Ok(())
        }
        GenerateCommand::Breakdown { project, script } => {
            let script = script_or_project(studio, &project, script)?;
            print_json(&StoryPanel::new(studio.clone()).breakdown(&script).await?)
        }
        GenerateCommand::Image { project, prompt } => {
            let asset = GeneratePanel::new(studio.clone()).generate(&project, &prompt).await?;
            println!("{}  {}", asset.id, asset.name);
            Ok(())
        }
        GenerateCommand::Character {
            project,
            description,
            style,
        } => {
            let style = ArtStyle::parse(&style).ok_or_else(|| {
                let known: Vec<&str> = ArtStyle::ALL.iter().map(|s| s.label()).collect();
                anyhow!("unknown art style {style}; expected one of {}", known.join(", "))
            })?;
            let panel = CharacterPanel::new(studio.clone());
            let draft = panel.generate(CharacterSpec::described(description, style)).await?;
            let asset = panel.save(&project, &draft).await?;
            println!("{}  {}", asset.id, asset.name);
            Ok(())
        }
        GenerateCommand::Animate {
            project,
            image,
            prompt,
            seconds,
        } => {
            let image = MediaFile::read(&image).await?;
            let updated = AnimatePanel::new(studio.clone())
                .animate(&project, &image, &prompt, seconds)
                .await?;
            if let Some(scene) = updated.scenes.last() {
                println!("scene {} ({})  {:.1}s", scene.number, scene.id, scene.duration);
            }
            Ok(())
        }
        GenerateCommand::Direct {
            project,
            scene,
            apply,
        } => {
            let panel = DirectorPanel::new(studio.clone());
            let analysis = panel.analyze(&project, &scene).await?;
            print_json(&analysis)?;
            if apply {
                panel.apply_camera_movement(&project, &scene, analysis.camera_work.recommended_movement)?;
                let duration = analysis.pacing.recommended_duration;
                if duration > 0.0 {
                    panel.apply_duration(&project, &scene, duration)?;
                } else {
                    warn!(duration, "no usable duration suggestion");
                }
            }
            Ok(())
        }
        GenerateCommand::Style {
            image,
            project,
            save_as,
        } => {
            let image = MediaFile::read(&image).await?;
            let panel = DrawingPanel::new(studio.clone());
            let style = panel.analyze_style(&image).await?;
            println!("{style}");
            if let (Some(project), Some(name)) = (project, save_as) {
                let profile = panel.save_profile(&project, &name, &style)?;
                info!(profile = %profile.id, "style profile saved");
            }
            Ok(())
        }
    }
}
