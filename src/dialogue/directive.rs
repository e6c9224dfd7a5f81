use crate::dialogue::page::RawDirective;

/// Default shake duration when `shake` carries no argument.
pub const DEFAULT_SHAKE_SECS: f64 = 0.3;
/// Default flash duration when `flash` carries no argument.
pub const DEFAULT_FLASH_SECS: f64 = 0.15;

/// Character stand / camera stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left stand, camera at the left stop.
    Left,
    /// Right stand, camera at the right stop.
    Right,
}

impl Side {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Kind of exclamation bubble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclamationKind {
    /// `objection`
    Objection,
    /// `holdit`
    HoldIt,
    /// `takethat`
    TakeThat,
}

impl ExclamationKind {
    /// Asset stem used for the bubble sprite and voice clip, e.g. `holdit`.
    pub fn stem(self) -> &'static str {
        match self {
            Self::Objection => "objection",
            Self::HoldIt => "holdit",
            Self::TakeThat => "takethat",
        }
    }
}

/// Typed inline directive.
///
/// Decoding is total: anything unrecognized or with bad arguments becomes [`Directive::Unknown`],
/// which dispatches as a no-op.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    /// Open a wait window of `secs`.
    Wait {
        /// Window length, always finite and > 0.
        secs: f64,
    },
    /// Swap the sprite on a stand.
    Sprite {
        /// Stand to change.
        side: Side,
        /// Sprite path relative to the asset root.
        path: String,
    },
    /// One-shot sound effect by short name.
    PlaySound {
        /// Effect name, e.g. `pichoop`.
        name: String,
    },
    /// Start the voice-blip loop.
    StartBlip {
        /// Voice name, e.g. `male`.
        voice: String,
    },
    /// Stop the voice-blip loop.
    StopBlip,
    /// Shake the stage.
    Shake {
        /// Shake duration.
        secs: f64,
    },
    /// White flash over the stage.
    Flash {
        /// Flash duration.
        secs: f64,
    },
    /// Eased camera move to a stop.
    Pan {
        /// Destination stop.
        side: Side,
    },
    /// Instant camera move to a stop.
    Cut {
        /// Destination stop.
        side: Side,
    },
    /// Show the continue arrow.
    ShowArrow,
    /// Hide the continue arrow.
    HideArrow,
    /// Replace the nametag text.
    Nametag {
        /// New speaker name.
        text: String,
    },
    /// Start a music track (replacing the current one).
    MusicStart {
        /// Track name, e.g. `cross-moderato`.
        name: String,
    },
    /// Stop the current music track.
    MusicStop,
    /// Exclamation bubble with voice clip.
    Exclamation {
        /// Bubble kind.
        kind: ExclamationKind,
        /// Speaker whose voice clip to prefer.
        speaker: String,
    },
    /// Desk slam on a stand.
    DeskSlam {
        /// Stand that slams.
        side: Side,
    },
    /// Show the dialogue box.
    ShowBox,
    /// Hide the dialogue box.
    HideBox,
    /// Unrecognized or malformed directive.
    Unknown {
        /// Original directive name.
        name: String,
    },
}

fn positive_secs(arg: Option<&String>, default: f64) -> Option<f64> {
    match arg {
        None => Some(default),
        Some(s) => s.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0),
    }
}

impl Directive {
    /// Decode a raw directive.
    pub fn parse(raw: &RawDirective) -> Self {
        let args = &raw.args;
        let arg = |i: usize| args.get(i).map(String::as_str);
        let decoded = match raw.name.as_str() {
            "wait" => args
                .first()
                .and_then(|s| positive_secs(Some(s), 0.0))
                .map(|secs| Self::Wait { secs }),
            "sprite" => match (arg(0).and_then(Side::parse), arg(1)) {
                (Some(side), Some(path)) if !path.is_empty() => Some(Self::Sprite {
                    side,
                    path: path.to_owned(),
                }),
                _ => None,
            },
            "playsound" => arg(0).map(|name| Self::PlaySound {
                name: name.to_owned(),
            }),
            "startblip" => arg(0).map(|voice| Self::StartBlip {
                voice: voice.to_owned(),
            }),
            "stopblip" => Some(Self::StopBlip),
            "shake" => {
                positive_secs(args.first(), DEFAULT_SHAKE_SECS).map(|secs| Self::Shake { secs })
            }
            "flash" => {
                positive_secs(args.first(), DEFAULT_FLASH_SECS).map(|secs| Self::Flash { secs })
            }
            "pan" => arg(0).and_then(Side::parse).map(|side| Self::Pan { side }),
            "cut" => arg(0).and_then(Side::parse).map(|side| Self::Cut { side }),
            "showarrow" => Some(Self::ShowArrow),
            "hidearrow" => Some(Self::HideArrow),
            "nametag" if !args.is_empty() => {
                let text = args.join(" ");
                Some(Self::Nametag {
                    text: text.trim_matches('"').to_owned(),
                })
            }
            "music" => match (arg(0), arg(1)) {
                (Some("start"), Some(name)) => Some(Self::MusicStart {
                    name: name.to_owned(),
                }),
                (Some("stop"), None) => Some(Self::MusicStop),
                _ => None,
            },
            "objection" | "holdit" | "takethat" => {
                let kind = match raw.name.as_str() {
                    "objection" => ExclamationKind::Objection,
                    "holdit" => ExclamationKind::HoldIt,
                    _ => ExclamationKind::TakeThat,
                };
                Some(Self::Exclamation {
                    kind,
                    speaker: arg(0).unwrap_or("generic").to_owned(),
                })
            }
            "deskslam" => arg(0).and_then(Side::parse).map(|side| Self::DeskSlam { side }),
            "phoenixslam" => Some(Self::DeskSlam { side: Side::Left }),
            "edgeworthslam" => Some(Self::DeskSlam { side: Side::Right }),
            "showbox" => Some(Self::ShowBox),
            "hidebox" => Some(Self::HideBox),
            _ => None,
        };

        decoded.unwrap_or_else(|| {
            tracing::debug!(name = %raw.name, args = ?raw.args, "directive decoded as unknown");
            Self::Unknown {
                name: raw.name.clone(),
            }
        })
    }

    /// Short name for logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Wait { .. } => "wait",
            Self::Sprite { .. } => "sprite",
            Self::PlaySound { .. } => "playsound",
            Self::StartBlip { .. } => "startblip",
            Self::StopBlip => "stopblip",
            Self::Shake { .. } => "shake",
            Self::Flash { .. } => "flash",
            Self::Pan { .. } => "pan",
            Self::Cut { .. } => "cut",
            Self::ShowArrow => "showarrow",
            Self::HideArrow => "hidearrow",
            Self::Nametag { .. } => "nametag",
            Self::MusicStart { .. } => "music start",
            Self::MusicStop => "music stop",
            Self::Exclamation { kind, .. } => kind.stem(),
            Self::DeskSlam { .. } => "deskslam",
            Self::ShowBox => "showbox",
            Self::HideBox => "hidebox",
            Self::Unknown { name } => name,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dialogue/directive.rs"]
mod tests;
