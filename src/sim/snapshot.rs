//! Read-only view of the game state
//!
//! This is what renderers draw and what the remote agent receives. Field
//! names follow the wire schema (camelCase, `isLaunched`, `gameOver`).

use serde::{Deserialize, Serialize};

use super::state::{Ball, Block, BlockShape, GameState, Paddle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddleView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
}

impl From<&Paddle> for PaddleView {
    fn from(p: &Paddle) -> Self {
        Self {
            x: p.pos.x,
            y: p.pos.y,
            vx: p.vel.x,
            vy: p.vel.y,
            width: p.width,
            height: p.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
    pub speed: f32,
    pub is_launched: bool,
}

impl From<&Ball> for BallView {
    fn from(b: &Ball) -> Self {
        Self {
            x: b.pos.x,
            y: b.pos.y,
            dx: b.vel.x,
            dy: b.vel.y,
            radius: b.radius,
            speed: b.speed,
            is_launched: b.launched,
        }
    }
}

/// A block as bounding box plus, for triangles, its vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
    pub hits_remaining: u32,
    pub max_hits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<[[f32; 2]; 3]>,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        let bounds = block.shape.bounds();
        let (rotation, vertices) = match &block.shape {
            BlockShape::Rect(_) => (None, None),
            BlockShape::Triangle(tri) => (
                Some(tri.rotation),
                Some(tri.vertices.map(|v| [v.x, v.y])),
            ),
        };
        Self {
            x: bounds.min.x,
            y: bounds.min.y,
            width: bounds.size.x,
            height: bounds.size.y,
            active: block.active,
            hits_remaining: block.hits_remaining,
            max_hits: block.max_hits,
            rotation,
            vertices,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub paddle: PaddleView,
    pub ball: BallView,
    pub blocks: Vec<BlockView>,
    pub score: u64,
    pub lives: u32,
    pub game_over: bool,
    pub victory: bool,
}

impl From<&GameState> for StateSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            paddle: PaddleView::from(&state.paddle),
            ball: BallView::from(&state.ball),
            blocks: state.blocks.iter().map(BlockView::from).collect(),
            score: state.score,
            lives: state.lives,
            game_over: state.game_over,
            victory: state.victory,
        }
    }
}
