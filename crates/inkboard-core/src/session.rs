//! Drawing session: the state machine tying tools, gestures, the entity
//! store, selection and the text overlay together.
//!
//! Every operation is total. Events that don't apply in the current state
//! (stray moves, clicks on unknown ids, keys without an overlay) are no-ops.

use crate::canvas::{EntityStore, SceneSnapshot};
use crate::config::SessionConfig;
use crate::input::{EntityEvent, PointerEvent, SurfaceEvent};
use crate::selection::{BoundingBox, DragGeometry, Selection, commit_drag};
use crate::shapes::{
    ApproxTextMeasure, Entity, EntityId, EntityKind, SerializableColor, ShapeKind, TextLabel,
    TextMeasure,
};
use crate::text_overlay::{TextEditResult, TextKey, TextOverlay};
use crate::tools::{
    CursorIcon, GestureContext, GestureEngine, GestureUpdate, InFlight, ToolManager, ToolMode,
};
use kurbo::Point;

/// What a click on an entity did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Erase mode removed the entity.
    Erased(Entity),
    /// The entity was selected, with its highlight box if it has one.
    Selected(Option<BoundingBox>),
    /// No entity with that id.
    Missed,
}

/// A single user's drawing session.
pub struct Session {
    config: SessionConfig,
    tools: ToolManager,
    gesture: GestureEngine,
    store: EntityStore,
    selection: Selection,
    text_overlay: Option<TextOverlay>,
    color: SerializableColor,
    pen_width: f64,
    shape_stroke_width: f64,
    measure: Box<dyn TextMeasure>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Create a session with approximate text measurement.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_measure(config, Box::new(ApproxTextMeasure::default()))
    }

    /// Create a session that measures overlay text with `measure`.
    pub fn with_measure(config: SessionConfig, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            tools: ToolManager::new(config.initial_mode),
            gesture: GestureEngine::new(),
            store: EntityStore::new(),
            selection: Selection::default(),
            text_overlay: None,
            color: config.initial_color(),
            pen_width: config.clamp_width(config.pen_width),
            shape_stroke_width: config.clamp_width(config.shape_stroke_width),
            measure,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> ToolMode {
        self.tools.mode()
    }

    pub fn shape_kind(&self) -> Option<ShapeKind> {
        self.tools.shape_kind()
    }

    pub fn cursor(&self) -> CursorIcon {
        self.mode().cursor()
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn pen_width(&self) -> f64 {
        self.pen_width
    }

    pub fn shape_stroke_width(&self) -> f64 {
        self.shape_stroke_width
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The three collections, as the render surface consumes them.
    pub fn snapshot(&self) -> SceneSnapshot {
        self.store.snapshot()
    }

    /// Entity under construction by the active gesture.
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.gesture.in_flight()
    }

    pub fn is_drawing(&self) -> bool {
        self.gesture.is_active()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn text_overlay(&self) -> Option<&TextOverlay> {
        self.text_overlay.as_ref()
    }

    /// Whether the color picker is enabled.
    pub fn can_change_color(&self) -> bool {
        self.tools.can_change_color()
    }

    /// Whether entities of `kind` can be dragged right now.
    ///
    /// Text labels are always draggable; strokes and shapes only in select mode.
    pub fn is_draggable(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Text => true,
            EntityKind::Stroke | EntityKind::Shape => self.tools.geometry_draggable(),
        }
    }

    /// Toggle a toolbar mode and return the resulting mode.
    ///
    /// An unfinished gesture is committed first. The text overlay is
    /// dismissed unless the resulting mode is text.
    pub fn toggle_mode(&mut self, mode: ToolMode) -> ToolMode {
        self.finish_gesture();
        let next = self.tools.toggle(mode);
        if next != ToolMode::Text && self.text_overlay.take().is_some() {
            log::debug!("Dismissed text overlay on switch to {:?}", next);
        }
        next
    }

    /// Choose the shape primitive. Only possible with every toolbar mode off.
    pub fn choose_shape(&mut self, kind: ShapeKind) -> bool {
        self.tools.choose_shape(kind)
    }

    /// Set the drawing color. Ignored in select mode.
    pub fn set_color(&mut self, color: SerializableColor) -> bool {
        if !self.can_change_color() {
            log::debug!("Color picker disabled in {:?} mode", self.mode());
            return false;
        }
        self.color = color;
        true
    }

    /// Set the drawing color from a hex string such as `#df4b26`.
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        match SerializableColor::from_hex(hex) {
            Some(color) => self.set_color(color),
            None => {
                log::debug!("Ignoring invalid color {:?}", hex);
                false
            }
        }
    }

    /// Set the pen width, clamped into the slider range.
    pub fn set_pen_width(&mut self, width: f64) -> f64 {
        self.pen_width = self.config.clamp_width(width);
        self.pen_width
    }

    /// Set the shape outline width, clamped into the slider range.
    pub fn set_shape_stroke_width(&mut self, width: f64) -> f64 {
        self.shape_stroke_width = self.config.clamp_width(width);
        self.shape_stroke_width
    }

    fn gesture_context(&self) -> GestureContext {
        GestureContext {
            mode: self.tools.mode(),
            shape_kind: self.tools.shape_kind(),
            color: self.color,
            pen_width: self.pen_width,
            shape_stroke_width: self.shape_stroke_width,
        }
    }

    /// Handle pointer-down at a stage-local position.
    pub fn pointer_down(&mut self, position: Point) -> GestureUpdate {
        if self.gesture.is_active() {
            log::debug!("Pointer down during a gesture, finishing the previous one");
            self.finish_gesture();
        }
        let ctx = self.gesture_context();
        let update = self.gesture.begin(position, &ctx);
        if let GestureUpdate::TextAt(at) = update {
            self.text_overlay = Some(TextOverlay::open(
                at,
                self.config.font(),
                self.config.text_box_padding,
            ));
        }
        update
    }

    /// Handle pointer-move. Ignored unless a gesture is in progress.
    pub fn pointer_move(&mut self, position: Point) -> GestureUpdate {
        let update = self.gesture.update(position);
        if let GestureUpdate::TextAt(at) = update {
            if let Some(overlay) = self.text_overlay.as_mut() {
                overlay.move_to(at, self.measure.as_ref());
            }
        }
        update
    }

    /// Handle pointer-up. Returns the id of the entity the gesture committed.
    pub fn pointer_up(&mut self, _position: Point) -> Option<EntityId> {
        self.finish_gesture()
    }

    fn finish_gesture(&mut self) -> Option<EntityId> {
        let entity = self.gesture.end()?;
        let id = self.store.add(entity);
        log::debug!("Committed {:?} {}", self.store.kind_of(id), id);
        Some(id)
    }

    /// Handle a click on an entity.
    ///
    /// Erase mode removes it; any other mode selects it.
    pub fn click(&mut self, id: EntityId) -> ClickOutcome {
        if self.mode() == ToolMode::Erase {
            return match self.store.remove(id) {
                Some(entity) => {
                    log::debug!("Erased {:?} {}", entity.kind(), id);
                    if self.selection.is_selected(id) {
                        self.selection.clear();
                    }
                    ClickOutcome::Erased(entity)
                }
                None => ClickOutcome::Missed,
            };
        }

        match self.store.entity(id) {
            Some(entity) => {
                self.selection
                    .select(&entity, self.config.normalize_bounding_boxes);
                ClickOutcome::Selected(self.selection.bounding_box)
            }
            None => {
                log::debug!("Click on unknown entity {}", id);
                ClickOutcome::Missed
            }
        }
    }

    /// Handle the start of a drag. Records the dragged entity as selected.
    pub fn drag_start(&mut self, id: EntityId) -> bool {
        match self.store.kind_of(id) {
            Some(kind) if self.is_draggable(kind) => {
                self.selection.selected_id = Some(id);
                true
            }
            Some(kind) => {
                log::debug!("{:?} {} is not draggable in {:?} mode", kind, id, self.mode());
                false
            }
            None => false,
        }
    }

    /// Handle the end of a drag: commit the final geometry, then clear the
    /// selection and its box.
    pub fn drag_end(&mut self, id: EntityId, geometry: &DragGeometry) -> bool {
        let committed = match self.store.kind_of(id) {
            Some(kind) if self.is_draggable(kind) => commit_drag(&mut self.store, id, geometry),
            Some(kind) => {
                log::debug!("Ignoring drag end on {:?} {} in {:?} mode", kind, id, self.mode());
                false
            }
            None => {
                log::debug!("Drag ended on unknown entity {}", id);
                false
            }
        };
        self.selection.clear();
        committed
    }

    /// Handle a key typed into the text overlay.
    pub fn handle_key(&mut self, key: &TextKey) -> TextEditResult {
        let Some(overlay) = self.text_overlay.as_mut() else {
            return TextEditResult::NotHandled;
        };
        match key {
            TextKey::Character(text) => {
                overlay.insert(text, self.measure.as_ref());
                TextEditResult::Handled
            }
            TextKey::Backspace => {
                overlay.backspace(self.measure.as_ref());
                TextEditResult::Handled
            }
            // The configured font only sizes the overlay; labels are fixed at 20px
            TextKey::Enter => match overlay.confirm(TextLabel::DEFAULT_FONT_SIZE, self.color) {
                Some(label) => {
                    self.text_overlay = None;
                    self.store.add_text(label.clone());
                    log::debug!("Committed text {:?}", label.text);
                    TextEditResult::Committed(label)
                }
                None => TextEditResult::Handled,
            },
            TextKey::Escape => {
                self.text_overlay = None;
                TextEditResult::Cancelled
            }
        }
    }

    /// Replace the overlay's buffer, as an input element's change event does.
    pub fn set_text_input(&mut self, text: &str) -> bool {
        match self.text_overlay.as_mut() {
            Some(overlay) => {
                overlay.set_text(text, self.measure.as_ref());
                true
            }
            None => false,
        }
    }

    /// Dispatch a surface event.
    pub fn handle_event(&mut self, event: &SurfaceEvent) {
        match event {
            SurfaceEvent::Pointer(PointerEvent::Down { position }) => {
                self.pointer_down(*position);
            }
            SurfaceEvent::Pointer(PointerEvent::Move { position }) => {
                self.pointer_move(*position);
            }
            SurfaceEvent::Pointer(PointerEvent::Up { position }) => {
                self.pointer_up(*position);
            }
            SurfaceEvent::Entity(EntityEvent::Click { id }) => {
                self.click(*id);
            }
            SurfaceEvent::Entity(EntityEvent::DragStart { id }) => {
                self.drag_start(*id);
            }
            SurfaceEvent::Entity(EntityEvent::DragEnd { id, geometry }) => {
                self.drag_end(*id, geometry);
            }
            SurfaceEvent::Key(key) => {
                self.handle_key(key);
            }
        }
    }
}
