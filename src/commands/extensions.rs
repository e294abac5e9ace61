//! `lokoctl extensions` - list the registered extensions.

use anyhow::Result;
use clap::Args;

use crate::output::Output;
use crate::registry::ExtensionRegistry;

#[derive(Debug, Args)]
pub struct ExtensionsArgs {
    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

pub fn run(args: ExtensionsArgs) -> Result<()> {
    let registry = ExtensionRegistry::builtin();
    let catalog = registry.catalog();

    if args.format == "json" {
        let map: serde_json::Map<String, serde_json::Value> = catalog
            .into_iter()
            .map(|(label, names)| (label.to_string(), serde_json::json!(names)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    for (label, names) in catalog {
        Output::header(label);
        for name in names {
            Output::list_item(name);
        }
    }
    Ok(())
}
