use serde::{Deserialize, Serialize};

/// Application-level messages carried in the payload of `control` signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlMessage {
    #[serde(rename = "raisehand")]
    RaiseHand(bool),
    #[serde(rename = "volume")]
    Volume(VolumeLevels),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeLevels {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl VolumeLevels {
    pub fn clamped(self) -> Self {
        Self {
            low: clamp_level(self.low),
            mid: clamp_level(self.mid),
            high: clamp_level(self.high),
        }
    }
}

fn clamp_level(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

impl ControlMessage {
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_payload(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }
}
