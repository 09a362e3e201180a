use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use dbmon::AgentConfig;

pub const INIT: &str = "[agent]\n  interval = \"10s\"";
pub const OUTPUTS: &str = "[[outputs.prometheus_client]]\n  listen = \":9273\"";
pub const INPUTS: &str = r#"[[inputs.redis]]
  servers = ["tcp://TELEGRAF_REDIS_PREFIX_DBSERVICE:TELEGRAF_REDIS_PREFIX_DBPORT"]
  password = "TELEGRAF_REDIS_PREFIX_DBPASS"
  [inputs.redis.tags]
    db = "TELEGRAF_REDIS_PREFIX_DBNAME""#;

/// Stands in for the collector: records its config and env, then idles
const FAKE_COLLECTOR: &str = r#"dir=$(dirname "$0")
cp "$2" "$dir/collector.conf"
env | grep '^TELEGRAF_REDIS_PREFIX_' | sort > "$dir/collector.env.tmp"
mv "$dir/collector.env.tmp" "$dir/collector.env"
exec sleep 30
"#;

/// On-disk layout of an agent deployment rooted in a temp dir
pub struct Deployment {
    pub root: PathBuf,
}

impl Deployment {
    pub fn new(root: &Path) -> Self {
        let templates = root.join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("telegraf-init"), INIT).unwrap();
        fs::write(templates.join("telegraf-outputs"), OUTPUTS).unwrap();
        fs::write(templates.join("telegraf-inputs"), INPUTS).unwrap();
        fs::create_dir_all(root.join("secrets")).unwrap();
        fs::write(root.join("fake-collector.sh"), FAKE_COLLECTOR).unwrap();

        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn add_secret(
        &self,
        instance: &str,
        password: &str,
    ) {
        let dir = self.root.join("secrets").join(format!("{}-credentials", instance));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("password"), password).unwrap();
    }

    pub fn config(&self) -> AgentConfig {
        let mut config = AgentConfig::default();
        config.cluster.namespace = "redis".to_string();
        config.template.dir = self.root.join("templates");
        config.secrets.dir = self.root.join("secrets");
        config.collector.command = format!("exec sh {}", self.root.join("fake-collector.sh").display());
        config.collector.config_path = self.root.join("telegraf.conf");
        config.collector.stop_timeout_ms = 2000;
        config.debounce.quiet_period_ms = 200;
        config
    }

    /// What the last collector saw as its configuration
    pub fn collector_conf(&self) -> Option<String> {
        fs::read_to_string(self.root.join("collector.conf")).ok()
    }

    pub fn collector_env(&self) -> Option<String> {
        fs::read_to_string(self.root.join("collector.env")).ok()
    }

    pub fn reset_observations(&self) {
        let _ = fs::remove_file(self.root.join("collector.conf"));
        let _ = fs::remove_file(self.root.join("collector.env"));
    }
}

pub async fn wait_until<F>(mut condition: F) -> bool
where F: FnMut() -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}
