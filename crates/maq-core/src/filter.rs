//! Filter and adjustment library for image nodes.
//!
//! An `EffectChain` is an ordered list of named adjustment operations.
//! Chains are declarative: the rendering engine always re-applies them to
//! the node's original, unfiltered source pixels, so re-applying an
//! identical chain is idempotent and chain equality is the observable
//! contract. Applying a preset *replaces* a node's chain; chains never
//! stack on top of prior results.

use crate::model::{Node, NodeKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Operations ──────────────────────────────────────────────────────────

/// One named adjustment operation with clamped parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum EffectOp {
    Grayscale,
    /// value in [-1, 1]
    Brightness { value: f32 },
    /// value in [-1, 1]
    Contrast { value: f32 },
    /// value in [-1, 1]
    Saturation { value: f32 },
    /// degrees, wrapped into [0, 360)
    HueRotate { degrees: f32 },
    /// radius in canvas units, non-negative
    Blur { radius: f32 },
}

impl EffectOp {
    pub fn brightness(value: f32) -> Self {
        Self::Brightness {
            value: value.clamp(-1.0, 1.0),
        }
    }

    pub fn contrast(value: f32) -> Self {
        Self::Contrast {
            value: value.clamp(-1.0, 1.0),
        }
    }

    pub fn saturation(value: f32) -> Self {
        Self::Saturation {
            value: value.clamp(-1.0, 1.0),
        }
    }

    pub fn hue_rotate(degrees: f32) -> Self {
        Self::HueRotate {
            degrees: degrees.rem_euclid(360.0),
        }
    }

    pub fn blur(radius: f32) -> Self {
        Self::Blur {
            radius: radius.max(0.0),
        }
    }
}

// ─── Chains ──────────────────────────────────────────────────────────────

/// Ordered adjustment operations owned by exactly one image node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectChain(SmallVec<[EffectOp; 4]>);

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: &[EffectOp]) -> Self {
        Self(SmallVec::from_slice(ops))
    }

    pub fn ops(&self) -> &[EffectOp] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, op: EffectOp) {
        self.0.push(op);
    }
}

// ─── Presets ─────────────────────────────────────────────────────────────

/// The fixed catalog of named looks offered in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    Sepia,
    NoirEtBlanc,
    Vintage,
    Eclat,
    Brume,
}

const SEPIA_OPS: &[EffectOp] = &[
    EffectOp::Grayscale,
    EffectOp::Brightness { value: 0.05 },
    EffectOp::Contrast { value: -0.1 },
    EffectOp::HueRotate { degrees: 35.0 },
];

const NOIR_ET_BLANC_OPS: &[EffectOp] = &[
    EffectOp::Grayscale,
    EffectOp::Contrast { value: 0.15 },
];

const VINTAGE_OPS: &[EffectOp] = &[
    EffectOp::Saturation { value: -0.35 },
    EffectOp::Contrast { value: -0.12 },
    EffectOp::Brightness { value: 0.06 },
];

const ECLAT_OPS: &[EffectOp] = &[
    EffectOp::Saturation { value: 0.3 },
    EffectOp::Contrast { value: 0.12 },
];

const BRUME_OPS: &[EffectOp] = &[
    EffectOp::Blur { radius: 2.5 },
    EffectOp::Brightness { value: 0.08 },
];

impl Preset {
    pub const ALL: &[Preset] = &[
        Preset::Sepia,
        Preset::NoirEtBlanc,
        Preset::Vintage,
        Preset::Eclat,
        Preset::Brume,
    ];

    /// Display name shown in the editor's filter palette.
    pub fn display_name(&self) -> &'static str {
        match self {
            Preset::Sepia => "Sépia",
            Preset::NoirEtBlanc => "Noir & Blanc",
            Preset::Vintage => "Vintage",
            Preset::Eclat => "Éclat",
            Preset::Brume => "Brume",
        }
    }

    pub fn by_name(name: &str) -> Option<Preset> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.display_name() == name)
    }

    /// The preset's operations, in application order.
    pub fn ops(&self) -> &'static [EffectOp] {
        match self {
            Preset::Sepia => SEPIA_OPS,
            Preset::NoirEtBlanc => NOIR_ET_BLANC_OPS,
            Preset::Vintage => VINTAGE_OPS,
            Preset::Eclat => ECLAT_OPS,
            Preset::Brume => BRUME_OPS,
        }
    }

    pub fn chain(&self) -> EffectChain {
        EffectChain::from_ops(self.ops())
    }
}

// ─── Continuous adjustments ──────────────────────────────────────────────

/// Slider-driven adjustments, each in [-1, 1]. Zero means "not applied".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Adjustments {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Adjustments {
    pub fn new(brightness: f32, contrast: f32, saturation: f32) -> Self {
        Self {
            brightness: brightness.clamp(-1.0, 1.0),
            contrast: contrast.clamp(-1.0, 1.0),
            saturation: saturation.clamp(-1.0, 1.0),
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Build a chain of only the non-zero operations, in the fixed order
    /// brightness → contrast → saturation.
    pub fn chain(&self) -> EffectChain {
        let mut chain = EffectChain::new();
        if self.brightness != 0.0 {
            chain.push(EffectOp::brightness(self.brightness));
        }
        if self.contrast != 0.0 {
            chain.push(EffectOp::contrast(self.contrast));
        }
        if self.saturation != 0.0 {
            chain.push(EffectOp::saturation(self.saturation));
        }
        chain
    }
}

// ─── Application to nodes ────────────────────────────────────────────────

/// Replace an image node's chain with `chain`. Returns false for
/// non-image nodes, which carry no effects.
pub fn set_effect_chain(node: &mut Node, chain: EffectChain) -> bool {
    match &mut node.kind {
        NodeKind::Image { effects, .. } => {
            *effects = chain;
            true
        }
        _ => false,
    }
}

/// Replace an image node's chain with a preset's operations.
pub fn apply_preset(node: &mut Node, preset: Preset) -> bool {
    set_effect_chain(node, preset.chain())
}

/// Replace an image node's chain with continuous adjustments.
pub fn apply_adjustments(node: &mut Node, adjustments: Adjustments) -> bool {
    set_effect_chain(node, adjustments.chain())
}

/// Drop every effect from an image node.
pub fn clear_effects(node: &mut Node) -> bool {
    set_effect_chain(node, EffectChain::new())
}
