// Application assembly
// Resolves the bundle directory, installs the title override, then binds and serves

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{AppState, Config};
use crate::logger;
use crate::server;
use crate::webapp::{self, TitleResolver};

/// A fully prepared front door, ready to bind
pub struct App {
    state: Arc<AppState>,
}

/// Build the application with the process environment as the title source
pub fn build_app(config: Config) -> App {
    let resolver = TitleResolver::new(&config.webapp);
    build_app_with_resolver(config, resolver)
}

/// Build the application with an explicit title resolver.
///
/// When the bundle directory exists, `index.html` is patched on disk before
/// anything is served. A missing directory disables the static mount.
pub fn build_app_with_resolver(config: Config, resolver: TitleResolver) -> App {
    let static_dir = absolute_dir(&config.webapp.static_dir);

    let static_mounted = if static_dir.is_dir() {
        webapp::run_install(&static_dir, &resolver);
        true
    } else {
        logger::log_static_dir_missing(&static_dir);
        false
    };

    App {
        state: Arc::new(AppState::new(config, static_dir, resolver, static_mounted)),
    }
}

impl App {
    /// Bind the configured address and serve until shutdown
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.state.config.get_socket_addr()?;
        let listener = server::create_reusable_listener(addr)?;

        logger::log_server_start(
            &addr,
            &self.state.config,
            &self.state.static_dir,
            self.state.static_mounted,
        );

        // Use LocalSet for spawn_local support
        let local = tokio::task::LocalSet::new();
        local
            .run_until(server::run_server(listener, self.state))
            .await
    }
}

fn absolute_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| dir.to_path_buf(), |cwd| cwd.join(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebAppConfig;
    use std::collections::HashMap;

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.webapp = WebAppConfig {
            static_dir: dir.to_path_buf(),
            env_file: None,
            ..WebAppConfig::default()
        };
        config
    }

    fn resolver(config: &Config, title: Option<&str>) -> TitleResolver {
        let mut env = HashMap::new();
        if let Some(title) = title {
            env.insert("WEBAPP_TITLE".to_string(), title.to_string());
        }
        TitleResolver::with_env(&config.webapp, Arc::new(env))
    }

    #[test]
    fn test_build_patches_index_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<html><head><title>Old</title></head><body></body></html>",
        )
        .unwrap();

        let config = config_for(dir.path());
        let resolver = resolver(&config, Some("Emby Club"));
        let app = build_app_with_resolver(config, resolver);

        assert!(app.state.static_mounted);
        let patched = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(patched.contains("<title>Emby Club</title>"));
        assert!(dir.path().join(webapp::install::BACKUP_DOCUMENT).is_file());
    }

    #[test]
    fn test_missing_static_dir_is_not_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("dist");

        let config = config_for(&missing);
        let resolver = resolver(&config, Some("Emby Club"));
        let app = build_app_with_resolver(config, resolver);

        assert!(!app.state.static_mounted);
        assert_eq!(app.state.static_dir, missing);
        assert!(!missing.exists());
    }

    #[test]
    fn test_relative_static_dir_becomes_absolute() {
        assert!(absolute_dir(Path::new("webapp")).is_absolute());
        assert_eq!(absolute_dir(Path::new("/srv/webapp")), PathBuf::from("/srv/webapp"));
    }
}
