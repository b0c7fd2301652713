//! Renderer-agnostic description of a composed car.
//!
//! A [`CarScene`] is rebuilt from scratch for every configuration and never
//! edited afterwards. The render layer maps it onto Bevy meshes and materials.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::config::PaintColor;

/// Primitive geometry. Dimensions are full extents, not half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Box { size: Vec3 },
    /// Axis along local Y.
    Cylinder { radius: f32, height: f32 },
    /// Horizontal plane facing +Y.
    Plane { width: f32, depth: f32 },
}

/// Self-illumination layered on top of the base color.
#[derive(Clone, Debug, PartialEq)]
pub struct Emission {
    pub color: PaintColor,
    pub intensity: f32,
}

/// Surface parameters in metallic/roughness terms.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDesc {
    pub base_color: PaintColor,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Option<Emission>,
    /// `Some` marks the surface as alpha-blended.
    pub opacity: Option<f32>,
}

impl MaterialDesc {
    /// Plain dielectric surface: no metal, fully rough.
    pub fn matte(color: PaintColor) -> Self {
        Self {
            base_color: color,
            metallic: 0.0,
            roughness: 1.0,
            emissive: None,
            opacity: None,
        }
    }

    pub fn with_surface(mut self, metallic: f32, roughness: f32) -> Self {
        self.metallic = metallic;
        self.roughness = roughness;
        self
    }

    pub fn with_emission(mut self, color: PaintColor, intensity: f32) -> Self {
        self.emissive = Some(Emission { color, intensity });
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

/// A single renderable shape, positioned relative to its part.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub transform: Transform,
    pub material: MaterialDesc,
    pub casts_shadow: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WheelSlot {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

/// What a part represents on the car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartKind {
    Chassis,
    Cabin,
    Wheel(WheelSlot),
    Spoiler,
    Headlight(Side),
    TailLight,
    Underglow,
}

/// A group of primitives sharing one transform relative to the car origin.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePart {
    pub kind: PartKind,
    pub transform: Transform,
    pub primitives: SmallVec<[Primitive; 2]>,
}

impl ScenePart {
    pub fn single(kind: PartKind, translation: Vec3, primitive: Primitive) -> Self {
        let mut primitives = SmallVec::new();
        primitives.push(primitive);
        Self {
            kind,
            transform: Transform::from_translation(translation),
            primitives,
        }
    }
}

/// Complete car composition for one configuration snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarScene {
    pub parts: Vec<ScenePart>,
}

impl CarScene {
    pub fn parts_where(
        &self,
        predicate: impl Fn(PartKind) -> bool,
    ) -> impl Iterator<Item = &ScenePart> {
        self.parts.iter().filter(move |part| predicate(part.kind))
    }

    pub fn part(&self, kind: PartKind) -> Option<&ScenePart> {
        self.parts.iter().find(|part| part.kind == kind)
    }

    pub fn primitive_count(&self) -> usize {
        self.parts.iter().map(|part| part.primitives.len()).sum()
    }
}
