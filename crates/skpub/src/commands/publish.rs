//! Publish command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use skpub_github::ReleasePublisher;
use skpub_registry::RegistrySubmitter;

use super::{GlobalArgs, runtime};
use crate::session::{self, Plugin};

/// Arguments for the publish command.
#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Release tag (defaults to v{version} from package.json)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Zip archive to upload (defaults to {bundle}.zip in the plugin directory)
    #[arg(short, long)]
    pub asset: Option<PathBuf>,

    /// Asset name on the release (defaults to the archive file name)
    #[arg(long)]
    pub asset_name: Option<String>,

    /// Also submit the plugin to the plugin registry
    #[arg(short, long)]
    pub registry: bool,

    /// Print what would be published without calling GitHub
    #[arg(short, long)]
    pub dry_run: bool,
}

/// What a publish run does.
struct Plan {
    tag: String,
    asset: PathBuf,
    asset_name: String,
}

impl Plan {
    fn resolve(globals: &GlobalArgs, plugin: &Plugin, args: PublishArgs) -> Result<Self> {
        let tag = match args.tag {
            Some(tag) => tag,
            None => match &plugin.manifest.version {
                Some(version) => format!("v{version}"),
                None => bail!("package.json has no \"version\"; pass --tag"),
            },
        };

        let asset = args.asset.unwrap_or_else(|| {
            globals
                .dir
                .join(format!("{}.zip", plugin.manifest.bundle_name()))
        });

        let asset_name = match args.asset_name {
            Some(name) => name,
            None => asset
                .file_name()
                .and_then(|name| name.to_str())
                .map(ToString::to_string)
                .with_context(|| format!("invalid asset path: {}", asset.display()))?,
        };

        Ok(Self {
            tag,
            asset,
            asset_name,
        })
    }
}

/// Runs the publish command.
pub fn run(globals: &GlobalArgs, args: PublishArgs) -> Result<()> {
    let plugin = Plugin::load(&globals.dir)?;
    let register = args.registry;
    let dry_run = args.dry_run;
    let plan = Plan::resolve(globals, &plugin, args)?;

    if dry_run {
        println!("Dry run - nothing will be published");
        println!();
        println!("Repository: {}", plugin.repo);
        println!("Tag:        {}", plan.tag);
        println!("Asset:      {} ({})", plan.asset.display(), plan.asset_name);
        if register {
            println!("Registry:   submit after publishing");
        }
        return Ok(());
    }

    if !plan.asset.is_file() {
        bail!("asset not found: {}", plan.asset.display());
    }

    let config = session::load_config(&globals.dir)?;
    let client = session::client(&config, globals.token.clone())?;
    let registry_settings = if register {
        Some(session::registry_settings(&config)?)
    } else {
        None
    };

    runtime()?.block_on(async {
        client
            .ensure_push_access(&plugin.repo)
            .await
            .with_context(|| format!("cannot publish to {}", plugin.repo))?;

        let publisher = ReleasePublisher::new(&client);

        println!("Creating draft release {}...", plan.tag);
        let draft = publisher
            .create_draft_release(&plugin.repo, &plan.tag)
            .await
            .context("failed to create release")?;

        println!("Uploading {}...", plan.asset_name);
        publisher
            .upload_asset(&plugin.repo, draft.id, &plan.asset_name, &plan.asset)
            .await
            .context("failed to upload release asset")?;

        let release = publisher
            .publish_release(&plugin.repo, draft.id)
            .await
            .context("failed to publish release")?;

        match &release.html_url {
            Some(url) => println!("Published {} ({url})", release.tag_name),
            None => println!("Published {}", release.tag_name),
        }

        if let Some(settings) = registry_settings {
            info!(upstream = %settings.upstream, "submitting to registry");
            let submitter = RegistrySubmitter::new(&client, settings);
            let outcome = submitter
                .submit(&plugin.submission())
                .await
                .context("failed to submit plugin to the registry")?;
            super::register::report(&outcome);
        }

        Ok::<_, anyhow::Error>(())
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn plugin(dir: &TempDir, manifest: &str) -> Plugin {
        fs::write(dir.path().join("package.json"), manifest).unwrap();
        Plugin::load(dir.path()).unwrap()
    }

    fn args() -> PublishArgs {
        PublishArgs {
            tag: None,
            asset: None,
            asset_name: None,
            registry: false,
            dry_run: true,
        }
    }

    fn globals(dir: &TempDir) -> GlobalArgs {
        GlobalArgs {
            token: None,
            dir: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn test_plan_defaults() {
        let temp = TempDir::new().unwrap();
        let plugin = plugin(
            &temp,
            r#"{ "name": "my-plugin", "version": "1.2.0", "repository": "jane/my-plugin" }"#,
        );

        let plan = Plan::resolve(&globals(&temp), &plugin, args()).unwrap();
        assert_eq!(plan.tag, "v1.2.0");
        assert_eq!(plan.asset, temp.path().join("my-plugin.sketchplugin.zip"));
        assert_eq!(plan.asset_name, "my-plugin.sketchplugin.zip");
    }

    #[test]
    fn test_plan_uses_skpm_main() {
        let temp = TempDir::new().unwrap();
        let plugin = plugin(
            &temp,
            r#"{ "name": "p", "version": "0.1.0", "repository": "jane/p", "skpm": { "main": "Great.sketchplugin" } }"#,
        );

        let plan = Plan::resolve(&globals(&temp), &plugin, args()).unwrap();
        assert_eq!(plan.asset_name, "Great.sketchplugin.zip");
    }

    #[test]
    fn test_plan_overrides() {
        let temp = TempDir::new().unwrap();
        let plugin = plugin(&temp, r#"{ "name": "p", "repository": "jane/p" }"#);

        let plan = Plan::resolve(
            &globals(&temp),
            &plugin,
            PublishArgs {
                tag: Some("release-7".to_string()),
                asset: Some(PathBuf::from("/tmp/build/out.zip")),
                asset_name: Some("plugin.zip".to_string()),
                ..args()
            },
        )
        .unwrap();
        assert_eq!(plan.tag, "release-7");
        assert_eq!(plan.asset, PathBuf::from("/tmp/build/out.zip"));
        assert_eq!(plan.asset_name, "plugin.zip");
    }

    #[test]
    fn test_plan_requires_version_or_tag() {
        let temp = TempDir::new().unwrap();
        let plugin = plugin(&temp, r#"{ "name": "p", "repository": "jane/p" }"#);

        let err = Plan::resolve(&globals(&temp), &plugin, args())
            .err()
            .unwrap();
        assert!(err.to_string().contains("--tag"));
    }
}
