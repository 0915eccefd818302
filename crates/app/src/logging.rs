use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use tradesheet_core::config::LoggingConfig;

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "tradesheet.log";

/// # Summary
/// 初始化全局日志：控制台输出，外加可选的按天滚动文件。
///
/// # Logic
/// 1. `RUST_LOG` 存在时优先使用，否则使用配置中的级别。
/// 2. 配置了 `dir` 时挂载非阻塞文件写入层。
///
/// # Returns
/// * 文件写入器的 guard，必须持有到进程退出，否则尾部日志会丢失。
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}
