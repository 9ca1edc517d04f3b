use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gedcomfy::{GedcomStore, GedcomTree, PrivacyPolicy, StoreOptions};
use jsonld::{html, BaseUrl, ProjectionOptions, RecordStore, TreeContext};

#[derive(Parser)]
enum MdfArgs {
    Gedcom(GedcomArgs),
    Jsonld(JsonldArgs),
}

#[derive(Debug, clap::Args)]
struct GedcomArgs {
    #[command(subcommand)]
    command: GedcomCommands,
}

#[derive(Debug, Subcommand)]
enum GedcomCommands {
    /// Loads a file and reports how many individuals it holds.
    Validate { path: PathBuf },
}

#[derive(Debug, clap::Args)]
struct JsonldArgs {
    #[command(subcommand)]
    command: JsonldCommands,
}

#[derive(Debug, Subcommand)]
enum JsonldCommands {
    /// Prints the schema.org description of one individual.
    Render {
        path: PathBuf,
        xref: String,

        /// Name of the tree; defaults to the file name.
        #[arg(long)]
        tree: Option<String>,

        #[arg(long, env = "MDF_BASE_URL", default_value = "http://localhost/")]
        base_url: BaseUrl,

        #[arg(long, value_enum, default_value_t = Privacy::RespectRestrictions)]
        privacy: Privacy,

        /// Wrap the document for embedding in a web page.
        #[arg(long)]
        html: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Privacy {
    ShowAll,
    RespectRestrictions,
    HideLiving,
}

impl From<Privacy> for PrivacyPolicy {
    fn from(value: Privacy) -> PrivacyPolicy {
        match value {
            Privacy::ShowAll => PrivacyPolicy::ShowAll,
            Privacy::RespectRestrictions => PrivacyPolicy::RespectRestrictions,
            Privacy::HideLiving => PrivacyPolicy::HideLiving,
        }
    }
}

fn main() -> miette::Result<()> {
    let args = MdfArgs::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args {
        MdfArgs::Gedcom(args) => match args.command {
            GedcomCommands::Validate { path } => {
                let options = StoreOptions::new(BaseUrl::parse("http://localhost/")?);
                let tree = GedcomTree::read_file(&path, None, &options)?;

                tracing::info!(path = %path.display(), "file is valid");
                println!("{}: {} individuals", path.display(), tree.len());
            }
        },
        MdfArgs::Jsonld(args) => match args.command {
            JsonldCommands::Render {
                path,
                xref,
                tree,
                base_url,
                privacy,
                html: embed,
            } => {
                let options = StoreOptions::new(base_url.clone());
                let loaded = GedcomTree::read_file(&path, tree.as_deref(), &options)?;
                let context = loaded.context().clone();
                let store = GedcomStore::new().with_tree(loaded);

                let policy = PrivacyPolicy::from(privacy);
                let json = jsonld::render(
                    &store,
                    &policy,
                    &ProjectionOptions::new(base_url),
                    &context,
                    &xref,
                )?;

                if embed {
                    println!("{}", embedded(&store, &policy, &context, &xref, &json)?);
                } else {
                    println!("{json}");
                }
            }
        },
    }

    Ok(())
}

/// Wraps `json` for a page, if the individual's page would show it.
fn embedded(
    store: &GedcomStore,
    policy: &PrivacyPolicy,
    context: &TreeContext,
    xref: &str,
    json: &str,
) -> miette::Result<String> {
    let shown = store
        .resolve(context, xref)
        .is_some_and(|record| html::has_tab_content(&record, policy));

    if !shown {
        miette::bail!(
            code = "mdf::no_tab_content",
            help = "only individuals with a name are embedded",
            "Individual {xref} has no content to embed"
        );
    }

    Ok(html::tab_content(json))
}
