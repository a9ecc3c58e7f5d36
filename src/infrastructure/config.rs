use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub serial: SerialSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SerialSettings {
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl SerialSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineSettings {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_gate_threshold_volts")]
    pub gate_threshold_volts: f64,
    #[serde(default)]
    pub strength_min: f64,
    #[serde(default = "default_strength_max")]
    pub strength_max: f64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl PipelineSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            gate_threshold_volts: default_gate_threshold_volts(),
            strength_min: 0.0,
            strength_max: default_strength_max(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_read_timeout_ms() -> u64 {
    100
}

fn default_error_backoff_ms() -> u64 {
    100
}

fn default_max_line_bytes() -> usize {
    4096
}

fn default_history_capacity() -> usize {
    crate::domain::history::DEFAULT_HISTORY_CAPACITY
}

fn default_gate_threshold_volts() -> f64 {
    crate::application::classifier::DEFAULT_GATE_THRESHOLD_VOLTS
}

fn default_strength_max() -> f64 {
    150.0
}

fn default_tick_interval_ms() -> u64 {
    500
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Load `config/magfield.*` (optional) overlaid with `MAGFIELD__SECTION__KEY` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/magfield").required(false))
        .add_source(
            config::Environment::with_prefix("MAGFIELD")
                .separator("__")
                .try_parsing(true),
        );

    build_app_config(builder)
}

fn build_app_config(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<AppConfig> {
    let settings = builder.build()?;
    let app_config: AppConfig = settings.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

fn validate(app_config: &AppConfig) -> anyhow::Result<()> {
    let pipeline = &app_config.pipeline;
    if app_config.serial.port.trim().is_empty() {
        anyhow::bail!("serial.port must not be empty");
    }
    if app_config.serial.read_timeout_ms == 0 {
        anyhow::bail!("serial.read_timeout_ms must be positive");
    }
    if app_config.serial.max_line_bytes == 0 {
        anyhow::bail!("serial.max_line_bytes must be positive");
    }
    if pipeline.history_capacity == 0 {
        anyhow::bail!("pipeline.history_capacity must be at least 1");
    }
    if pipeline.strength_min.is_nan()
        || pipeline.strength_max.is_nan()
        || pipeline.strength_max <= pipeline.strength_min
    {
        anyhow::bail!(
            "pipeline.strength_max ({}) must be greater than pipeline.strength_min ({})",
            pipeline.strength_max,
            pipeline.strength_min
        );
    }
    if pipeline.tick_interval_ms == 0 {
        anyhow::bail!("pipeline.tick_interval_ms must be positive");
    }
    Ok(())
}
