use crate::assets::store::AssetStore;
use crate::dialogue::directive::Side;
use crate::dialogue::interpreter::TextBoxBinding;
use crate::director::config::DirectorConfig;
use crate::foundation::core::Rgba8;
use crate::foundation::error::ReelResult;
use crate::scene::graph::SceneGraph;
use crate::scene::node::{NodeId, SceneNode, TextRun};

/// Handles to the fixed, named nodes of the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cast {
    /// Panorama; the camera moves by moving this node.
    pub background: NodeId,
    /// Left character stand, child of the background.
    pub left: NodeId,
    /// Right character stand, child of the background.
    pub right: NodeId,
    /// Exclamation bubble overlay.
    pub exclamation: NodeId,
    /// Full-canvas white flash overlay.
    pub flash: NodeId,
    /// Dialogue box group.
    pub dialogue_box: NodeId,
    /// Dialogue text run.
    pub text: NodeId,
    /// Speaker nametag text run.
    pub nametag: NodeId,
    /// "Continue" arrow.
    pub arrow: NodeId,
}

impl Cast {
    /// Stand node on `side`.
    pub fn stand(&self, side: Side) -> NodeId {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Load the stage art and attach the cast under `scene`'s root.
    ///
    /// Paint order is fixed by z: background 0, stands 1-2, dialogue box 10-12, exclamation 20,
    /// flash 30.
    pub(crate) fn build(
        scene: &mut SceneGraph,
        assets: &mut AssetStore,
        cfg: &DirectorConfig,
    ) -> ReelResult<(Self, TextBoxBinding)> {
        let stage = &cfg.stage;
        let root = scene.root();

        let background = scene.add(
            root,
            SceneNode::sprite("Background", assets.load_sprite(&stage.background)?)
                .at(cfg.left_x, 0, 0),
        );
        let left = scene.add(
            background,
            SceneNode::sprite("Left Character", assets.load_sprite(&stage.left_sprite)?)
                .at(0, 0, 1),
        );
        let right = scene.add(
            background,
            SceneNode::sprite("Right Character", assets.load_sprite(&stage.right_sprite)?)
                .at(stage.right_stand_x, 0, 2),
        );

        let exclamation = scene.add(root, SceneNode::new("Exclamation").at(0, 0, 20).hidden());
        let flash = scene.add(
            root,
            SceneNode::fill("Flash", cfg.canvas.width, cfg.canvas.height, Rgba8::WHITE)
                .at(0, 0, 30)
                .hidden(),
        );

        let font = stage.font.as_deref().map(|p| assets.load_font(p)).transpose()?;
        let name_font = match stage.name_font.as_deref() {
            Some(p) => Some(assets.load_font(p)?),
            None => font.clone(),
        };

        let dialogue_box = scene.add(
            root,
            SceneNode::new("Dialogue Box").at(0, stage.dialogue_box_y, 12),
        );
        let box_bg = assets.load_sprite(&stage.dialogue_box)?;
        let (box_w, box_h) = {
            let f = box_bg.frame_at(0.0);
            (f.width as i32, f.height as i32)
        };
        scene.add(
            dialogue_box,
            SceneNode::sprite("Dialogue Box Background", box_bg).at(0, 0, 10),
        );
        let arrow_sprite = assets.load_sprite(&stage.arrow)?;
        let (arrow_w, arrow_h) = {
            let f = arrow_sprite.frame_at(0.0);
            (f.width as i32, f.height as i32)
        };
        let arrow = scene.add(
            dialogue_box,
            SceneNode::sprite("Dialogue Box Arrow", arrow_sprite)
                .at(box_w - arrow_w - 5, box_h - arrow_h - 5, 11)
                .hidden(),
        );
        let text = scene.add(
            dialogue_box,
            SceneNode::text(
                "Dialogue Text",
                TextRun::plain("", font, stage.text_size_px, Rgba8::WHITE),
            )
            .at(10, 4, 12),
        );
        let nametag = scene.add(
            dialogue_box,
            SceneNode::text(
                "Name Box Text",
                TextRun::plain("", name_font, stage.name_size_px, Rgba8::WHITE),
            )
            .at(5, -11, 12),
        );

        let mut binding = TextBoxBinding::bind(text);
        binding.nametag = Some(nametag);
        binding.palette = cfg.palette.clone();

        tracing::debug!(nodes = scene.len(), "stage cast built");
        Ok((
            Self {
                background,
                left,
                right,
                exclamation,
                flash,
                dialogue_box,
                text,
                nametag,
                arrow,
            },
            binding,
        ))
    }
}
