//! SpacetimeDB transport: turns the module's public replication tables into the
//! transport-agnostic messages [`crate::replication`] consumes.
//!
//! Needs the `stdb` feature and bindings generated from the server crate:
//! `spacetime generate --lang rust --out-dir client/src/module_bindings --project-path server`.

mod sync;
pub mod types;

use crate::module_bindings::{
    DbConnection, RemoteTables, ReplicationDescriptorTableAccess, ReplicationSettingsTableAccess,
    TransformSnapshotTableAccess,
};
use bevy::prelude::*;
use bevy_spacetimedb::{ReadStdbConnectedMessage, StdbConnection, StdbPlugin};

pub type SpacetimeDB<'a> = Res<'a, StdbConnection<DbConnection>>;

const DEFAULT_URI: &str = "http://127.0.0.1:3000";
const DEFAULT_MODULE: &str = "replication";

pub(super) fn plugin(app: &mut App) {
    let uri = std::env::var("STDB_URI").unwrap_or_else(|_| DEFAULT_URI.to_string());
    let module = std::env::var("STDB_MODULE").unwrap_or_else(|_| DEFAULT_MODULE.to_string());
    info!("Connecting to SpacetimeDB module {module} at {uri}");

    let stdb_plugin = StdbPlugin::default()
        .with_uri(&uri)
        .with_module_name(&module);

    let stdb_plugin = if let Some(tok) = read_token_from_cli_env() {
        info!("Using JWT from CLI/ENV for SpacetimeDB connection.");
        stdb_plugin.with_token(tok)
    } else {
        warn!("No JWT provided via CLI/ENV; identity will be ephemeral for this run.");
        stdb_plugin
    };

    app.add_plugins(
        stdb_plugin
            .add_table(RemoteTables::replication_descriptor)
            .add_table(RemoteTables::transform_snapshot)
            .add_table(RemoteTables::replication_settings)
            .with_run_fn(DbConnection::run_threaded),
    );
    app.add_systems(Update, on_connect);
    app.add_plugins(sync::plugin);
}

fn on_connect(mut messages: ReadStdbConnectedMessage, stdb: SpacetimeDB) {
    for message in messages.read() {
        info!("SpacetimeDB module connected: {:?}", message.identity);

        stdb.subscription_builder().subscribe(vec![
            "SELECT * FROM replication_descriptor",
            "SELECT * FROM transform_snapshot",
            "SELECT * FROM replication_settings",
        ]);
    }
}

/// Returns a JWT token from CLI args or environment if present.
///
/// Supported:
///   --token <JWT>
///   --token=<JWT>
///   --token-file <path>
///   --token-file=<path>
///   STDB_TOKEN or STDB_JWT environment variables
fn read_token_from_cli_env() -> Option<String> {
    token_from_args(std::env::args().skip(1)).or_else(|| {
        std::env::var("STDB_TOKEN")
            .or_else(|_| std::env::var("STDB_JWT"))
            .ok()
    })
}

fn token_from_args(args: impl IntoIterator<Item = String>) -> Option<String> {
    let read_file = |path: &str| std::fs::read_to_string(path).ok().map(|s| s.trim().to_string());

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--token" || arg == "-t" {
            return args.next();
        } else if let Some(val) = arg.strip_prefix("--token=") {
            return Some(val.to_string());
        } else if arg == "--token-file" {
            return args.next().and_then(|path| read_file(&path));
        } else if let Some(path) = arg.strip_prefix("--token-file=") {
            return read_file(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn token_flag_forms() {
        assert_eq!(token_from_args(args(&["--token", "abc"])), Some("abc".into()));
        assert_eq!(token_from_args(args(&["-t", "abc"])), Some("abc".into()));
        assert_eq!(token_from_args(args(&["--verbose", "--token=xyz"])), Some("xyz".into()));
        assert_eq!(token_from_args(args(&["--token"])), None);
        assert_eq!(token_from_args(args(&["--other"])), None);
    }

    #[test]
    fn token_file_is_trimmed() {
        let path = std::env::temp_dir().join(format!("stdb-token-{}", std::process::id()));
        std::fs::write(&path, "  jwt-from-file\n").unwrap();
        let path = path.to_string_lossy().to_string();

        assert_eq!(
            token_from_args(args(&["--token-file", &path])),
            Some("jwt-from-file".into())
        );
        assert_eq!(
            token_from_args(vec![format!("--token-file={path}")]),
            Some("jwt-from-file".into())
        );
        assert_eq!(token_from_args(args(&["--token-file", "/nonexistent/token"])), None);

        std::fs::remove_file(&path).unwrap();
    }
}
