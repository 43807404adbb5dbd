use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use realms_cli::commands;
use realms_cli::format::{
    format_words, parse_content, parse_poi, parse_prop, render_grid, render_history,
    render_record,
};
use realms_cli::CliConfig;
use realms_core::{calc_size, get_bit, Category, Content, Poi, Prop, Word};

#[derive(Parser, Debug)]
#[command(name = "realms")]
#[command(about = "Bitmap grids and revisioned lore entities for realm world state")]
struct Cli {
    /// State file (overrides REALMS_STATE)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Caller identity (overrides REALMS_CALLER)
    #[arg(long, global = true)]
    caller: Option<Word>,

    /// Usable bits per map word (overrides REALMS_WORD_BITS)
    #[arg(long, global = true)]
    word_bits: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bitmap grid helpers (stateless)
    #[command(subcommand)]
    Grid(GridCommand),
    /// Lore entity store
    #[command(subcommand)]
    Lore(LoreCommand),
    /// Invoke a function with raw calldata words
    Call {
        function: String,
        words: Vec<Word>,
    },
}

#[derive(Subcommand, Debug)]
enum GridCommand {
    /// Words needed for a size x size map
    CalcSize {
        #[arg(long)]
        size: u32,
    },
    Get(BitTarget),
    Set(BitTarget),
    Clear(BitTarget),
    /// Print the map as a matrix
    Render {
        #[arg(long)]
        size: u32,
        #[arg(long, value_delimiter = ',')]
        map: Vec<Word>,
    },
}

#[derive(Args, Debug)]
struct BitTarget {
    #[arg(long)]
    size: u32,
    /// Comma-separated map words
    #[arg(long, value_delimiter = ',')]
    map: Vec<Word>,
    /// Row-major cell index
    #[arg(long)]
    position: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WhitelistTarget {
    Kinds,
    Pois,
    Props,
}

impl From<WhitelistTarget> for Category {
    fn from(target: WhitelistTarget) -> Self {
        match target {
            WhitelistTarget::Kinds => Category::Kind,
            WhitelistTarget::Pois => Category::PointOfInterest,
            WhitelistTarget::Props => Category::Property,
        }
    }
}

#[derive(Subcommand, Debug)]
enum LoreCommand {
    /// Create a fresh state file
    Init {
        #[arg(long)]
        admin: Word,
        #[arg(long)]
        force: bool,
    },
    /// Approve (or revoke) ids in one category
    Whitelist {
        #[arg(value_enum)]
        category: WhitelistTarget,
        #[arg(required = true)]
        ids: Vec<u64>,
        #[arg(long)]
        revoke: bool,
    },
    /// List approved ids in one category
    Approved {
        #[arg(value_enum)]
        category: WhitelistTarget,
    },
    Create {
        #[arg(long, value_parser = parse_content)]
        content: Content,
        #[arg(long, default_value_t = 0)]
        kind: u64,
        #[arg(long = "poi", value_parser = parse_poi)]
        pois: Vec<Poi>,
        #[arg(long = "prop", value_parser = parse_prop)]
        props: Vec<Prop>,
    },
    /// Append a revision; omitting --kind keeps the current kind
    Revise {
        #[arg(long)]
        entity: u64,
        #[arg(long, value_parser = parse_content)]
        content: Content,
        #[arg(long)]
        kind: Option<u64>,
        #[arg(long = "poi", value_parser = parse_poi)]
        pois: Vec<Poi>,
    },
    Show {
        #[arg(long)]
        entity: u64,
        /// Defaults to the latest revision
        #[arg(long)]
        revision: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    History {
        #[arg(long)]
        entity: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env().with_overrides(cli.state, cli.caller, cli.word_bits)?;

    match cli.command {
        Commands::Grid(command) => run_grid(&config, command),
        Commands::Lore(command) => run_lore(&config, command),
        Commands::Call { function, words } => {
            let out = commands::call(&config, &function, &words)?;
            println!("{}", format_words(&out));
            Ok(())
        }
    }
}

fn run_grid(config: &CliConfig, command: GridCommand) -> Result<()> {
    match command {
        GridCommand::CalcSize { size } => {
            println!("{}", calc_size(size, config.word_bits)?);
        }
        GridCommand::Get(target) => {
            let grid = commands::grid(config, target.size, target.map)?;
            let bit = get_bit(grid.words(), grid.layout(), target.position)?;
            println!("{}", u8::from(bit));
        }
        GridCommand::Set(target) => {
            let mut grid = commands::grid(config, target.size, target.map)?;
            grid.set(target.position)?;
            println!("{}", format_words(grid.words()));
        }
        GridCommand::Clear(target) => {
            let mut grid = commands::grid(config, target.size, target.map)?;
            grid.clear(target.position)?;
            println!("{}", format_words(grid.words()));
        }
        GridCommand::Render { size, map } => {
            let grid = commands::grid(config, size, map)?;
            print!("{}", render_grid(&grid));
        }
    }
    Ok(())
}

fn run_lore(config: &CliConfig, command: LoreCommand) -> Result<()> {
    match command {
        LoreCommand::Init { admin, force } => {
            commands::init(&config.state_path, admin, force)?;
            println!("initialised {}", config.state_path.display());
        }
        LoreCommand::Whitelist {
            category,
            ids,
            revoke,
        } => {
            commands::whitelist(config, category.into(), &ids, revoke)?;
        }
        LoreCommand::Approved { category } => {
            let ids = commands::approved(config, category.into())?;
            let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
            println!("{}", ids.join(" "));
        }
        LoreCommand::Create {
            content,
            kind,
            pois,
            props,
        } => {
            let entity_id = commands::create(config, content, kind, pois, props)?;
            println!("{entity_id}");
        }
        LoreCommand::Revise {
            entity,
            content,
            kind,
            pois,
        } => {
            let revision_id = commands::revise(config, entity, content, kind, pois)?;
            println!("{revision_id}");
        }
        LoreCommand::Show {
            entity,
            revision,
            json,
        } => {
            let (revision_id, record) = commands::show(config, entity, revision)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print!("{}", render_record(entity, revision_id, &record));
            }
        }
        LoreCommand::History { entity } => {
            let revisions = commands::history(config, entity)?;
            print!("{}", render_history(&revisions));
        }
    }
    Ok(())
}
