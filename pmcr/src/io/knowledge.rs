//! Knowledge persistence: insight aggregation over run artifacts.
//!
//! A [`KnowledgeEntry`] freezes the heuristic analysis of one artifact
//! together with what the run learned. Entries are append-only and keyed by a
//! content hash of the source artifact; the hash is an identity hint, not a
//! dedup key.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::insight::{InsightRecord, analyze};
use crate::core::types::Reflection;

/// Schema version tag written into every entry.
pub const KNOWLEDGE_VERSION: &str = "1.0";

/// Append-only aggregate of one artifact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub timestamp: DateTime<Utc>,
    /// blake3 hex digest of the source artifact text.
    pub source_hash: String,
    pub insight: InsightRecord,
    pub learning_outcomes: Vec<String>,
    pub success_patterns: Vec<String>,
    pub version: String,
}

impl KnowledgeEntry {
    /// Analyze `artifact_text` and aggregate it with the run's reflection.
    pub fn from_artifact(artifact_text: &str, reflection: &Reflection) -> Self {
        Self {
            timestamp: Utc::now(),
            source_hash: blake3::hash(artifact_text.as_bytes()).to_hex().to_string(),
            insight: analyze(artifact_text),
            learning_outcomes: reflection.lessons_learned.clone(),
            success_patterns: reflection.knowledge_updates.clone(),
            version: KNOWLEDGE_VERSION.to_string(),
        }
    }
}

/// Append-only sink for knowledge entries. Same contract as the audit sink:
/// per-entry atomic appends, failures surfaced but never run-fatal.
pub trait KnowledgeSink {
    fn append(&self, entry: &KnowledgeEntry) -> Result<()>;
}

/// File-backed sink writing one compact JSON object per line.
pub struct JsonlKnowledgeSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlKnowledgeSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KnowledgeSink for JsonlKnowledgeSink {
    fn append(&self, entry: &KnowledgeEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry).context("serialize knowledge entry")?;
        line.push('\n');
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("knowledge sink lock poisoned"))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create knowledge dir {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open knowledge log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append knowledge log {}", self.path.display()))?;
        Ok(())
    }
}

/// Canned product documentation used by the CLI demo path and as a realistic
/// corpus for insight tests.
pub fn demo_product_info(product_name: &str) -> String {
    match product_name.to_lowercase().as_str() {
        "glowbrew" => "\
Product Description:
GlowBrew is a revolutionary AI driven coffee machine with industry leading number of LEDs and programmable light shows. The machine is also capable of brewing coffee and has a built in grinder.

Product Features:
1. **Luminous Brew Technology**: Customize your morning ambiance with programmable LED lights that sync with your brewing process.
2. **AI Taste Assistant**: Learns your taste preferences over time and suggests new brew combinations to explore.
3. **Gourmet Aroma Diffusion**: Built-in aroma diffusers enhance your coffee's scent profile, energizing your senses before the first sip.

Troubleshooting:
- **Issue**: LED Lights Malfunctioning
    - **Solution**: Reset the lighting settings via the app. Ensure the LED connections inside the GlowBrew are secure. Perform a factory reset if necessary.
"
        .to_string(),
        "smartfridge" => "\
Product Description:
SmartFridge is an intelligent refrigerator with AI-powered food management, automated inventory tracking, and smart temperature control.

Product Features:
1. **AI Food Recognition**: Automatically identifies and categorizes food items using computer vision.
2. **Expiry Tracking**: Monitors expiration dates and sends alerts for items nearing expiry.
3. **Smart Shopping Lists**: Generates shopping lists based on inventory and consumption patterns.
4. **Energy Optimization**: AI-driven temperature control for optimal energy efficiency.

Troubleshooting:
- **Issue**: Temperature Fluctuations
    - **Solution**: Check door seals, ensure proper ventilation, and reset temperature settings via the mobile app.
"
        .to_string(),
        "quantumphone" => "\
Product Description:
QuantumPhone is the world's first quantum-secured smartphone with advanced AI capabilities and holographic display technology.

Product Features:
1. **Quantum Encryption**: Unbreakable quantum-secured communications and data storage.
2. **Holographic Display**: 3D holographic projections for immersive user experience.
3. **AI Personal Assistant**: Advanced AI that learns and adapts to user behavior patterns.
4. **Quantum Computing Integration**: Access to quantum computing resources for complex tasks.

Troubleshooting:
- **Issue**: Holographic Display Not Working
    - **Solution**: Ensure adequate lighting, check holographic projector alignment, and restart the device.
"
        .to_string(),
        _ => format!(
            "\
Product Description:
{product_name} is a cutting-edge product with advanced features and innovative technology.

Product Features:
1. **Advanced Technology**: State-of-the-art features and capabilities.
2. **User-Friendly Design**: Intuitive interface and easy-to-use controls.
3. **Smart Integration**: Seamless connectivity with other devices and services.
4. **Performance Optimization**: Optimized for maximum efficiency and reliability.

Troubleshooting:
- **Issue**: General Performance Issues
    - **Solution**: Restart the device, check for updates, and ensure proper setup and configuration.
"
        ),
    }
}
