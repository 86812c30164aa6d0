use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use hoard_server::{HoardServer, ServerConfig};
use hoard_store::{BlobStore, FileSystemStore, SaveRequest, Sha256Naming, StoreConfig};
use hoard_types::Identifier;

use crate::cli::*;

const DEFAULT_ROOT: &str = "./data";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let layout = Layout {
        root: cli.root,
        depth: cli.depth,
        segment_len: cli.segment_len,
    };
    match cli.command {
        Command::Serve(args) => cmd_serve(&layout, args),
        Command::Put(args) => {
            let store = layout.open()?;
            let id = cmd_put(&store, &args)?;
            println!("{} {}", "✓".green().bold(), id.as_str().yellow());
            println!("  Path: {}", store.path_for(&id)?.display());
            Ok(())
        }
        Command::Get(args) => {
            let store = layout.open()?;
            let size = cmd_get(&store, &args)?;
            if let Some(output) = &args.output {
                eprintln!("{} wrote {} bytes to {}", "✓".green().bold(), size, output.display());
            }
            Ok(())
        }
        Command::Rm(args) => {
            let store = layout.open()?;
            cmd_rm(&store, &args)?;
            println!("{} Deleted {}", "✓".green().bold(), args.id.yellow());
            Ok(())
        }
        Command::Path(args) => {
            let store = layout.open()?;
            println!("{}", cmd_path(&store, &args)?.display());
            Ok(())
        }
    }
}

/// Store layout flags shared by every subcommand.
pub struct Layout {
    pub root: Option<PathBuf>,
    pub depth: Option<i64>,
    pub segment_len: Option<i64>,
}

impl Layout {
    fn apply(&self, mut config: StoreConfig) -> StoreConfig {
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(segment_len) = self.segment_len {
            config.segment_len = segment_len;
        }
        config
    }

    /// Local store config, staging inside the root.
    fn store_config(&self) -> StoreConfig {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
        self.apply(StoreConfig::rooted(root))
    }

    fn open(&self) -> anyhow::Result<FileSystemStore> {
        let config = self.store_config();
        FileSystemStore::new(config).context("invalid store layout")
    }
}

fn cmd_serve(layout: &Layout, args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(layout, &args)?;
    let server = HoardServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn server_config(layout: &Layout, args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServerConfig::default(),
    }
    .apply_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = &layout.root {
        config.storage.root = root.clone();
    }
    config.storage = layout.apply(config.storage);
    Ok(config)
}

fn parse_id(raw: &str) -> anyhow::Result<Identifier> {
    Identifier::parse(raw).with_context(|| format!("not a valid identifier: {raw:?}"))
}

fn cmd_put(store: &FileSystemStore, args: &PutArgs) -> anyhow::Result<Identifier> {
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let mut body = BufReader::new(file);
    let naming = Sha256Naming::new();
    let mut request = SaveRequest::new(&mut body).naming(&naming);
    if let Some(content_type) = args.content_type.as_deref() {
        request = request.content_type(content_type);
    }
    Ok(store.save(request)?)
}

fn cmd_get(store: &FileSystemStore, args: &GetArgs) -> anyhow::Result<u64> {
    let id = parse_id(&args.id)?;
    let mut handle = store.load(&id)?;
    let copied = match &args.output {
        Some(path) => {
            let mut out = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let n = io::copy(&mut handle, &mut out)?;
            out.sync_all()?;
            n
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let n = io::copy(&mut handle, &mut out)?;
            out.flush()?;
            n
        }
    };
    Ok(copied)
}

fn cmd_rm(store: &FileSystemStore, args: &RmArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    store.delete(&id)?;
    Ok(())
}

fn cmd_path(store: &FileSystemStore, args: &PathArgs) -> anyhow::Result<PathBuf> {
    let id = parse_id(&args.id)?;
    Ok(store.path_for(&id)?)
}
