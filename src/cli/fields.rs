//! CLI entry-point for browsing field metadata.

use anyhow::{anyhow, Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    data::{metadata::FieldMetadata, openfda::OpenFdaClient},
};

/// Args for the `fields` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Dot separated key path, e.g. patient.properties.patientagegroup.
    #[arg(long)]
    pub path: Option<String>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let client = OpenFdaClient::new(&settings).context("building OpenFDA client")?;
    let meta = FieldMetadata::fetch(&client, &settings.metadata_url)
        .await
        .context("fetching field metadata")?;

    let Some(path) = args.path else {
        for name in meta.field_names() {
            println!("{name}");
        }
        return Ok(());
    };

    if let Some(values) = meta.possible_values(&path) {
        for (code, description) in values {
            println!("{code}\t{description}");
        }
        return Ok(());
    }

    let node = meta
        .lookup_dotted(&path)
        .ok_or_else(|| anyhow!("no metadata at {path}"))?;
    print!("{}", serde_yaml::to_string(node)?);
    Ok(())
}
