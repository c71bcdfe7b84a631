use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};

use desk_buddy::config::BuddyConfig;

const ROTATE_SIZE: u64 = 5 * 1024 * 1024;
const ROTATE_KEEP: usize = 3;

/// `RUST_LOG` overrides the configured level. Without a `log_file` the log
/// goes to stderr.
pub fn init_logging(config: &BuddyConfig) -> anyhow::Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(&config.log_level)?;
    let logger = match &config.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let basename = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("desk-buddy")
                .to_string();
            logger
                .log_to_file(FileSpec::default().directory(directory).basename(basename))
                .rotate(
                    Criterion::Size(ROTATE_SIZE),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(ROTATE_KEEP),
                )
        }
        None => logger.log_to_stderr(),
    };
    Ok(logger.start()?)
}
