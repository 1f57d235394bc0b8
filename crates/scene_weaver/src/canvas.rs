//! # Canvas
//!
//! The assembled runtime: a scene root holding the top-level nodes, a camera,
//! an output surface and the interaction state. The host drives it with
//! [`HostEvent`]s, either one call at a time or through [`Canvas::run`].
//!
//! Each frame runs the animation phase (every `render` callback, depth-first)
//! and then renders. Pointer moves raycast from the camera and reconcile the
//! hover set; click-style events go to the nearest hit only.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info, trace, warn};

use crate::assets::AssetStore;
use crate::config::StageConfig;
use crate::descriptor::Descriptor;
use crate::picking::{dispatch_nearest, HoverSet, Intersection, PointerState, Raycaster};
use crate::reconcile::Reconciler;
use crate::render::{Camera, RenderSurface, SurfaceError, Viewport};
use crate::scene::{NodeId, Object3D, ObjectKind, PointerEvent, SceneGraph};

/// Canvas failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
    /// The surface was already handed to a mount target
    #[error("canvas surface is already mounted")]
    AlreadyMounted,

    /// The output surface failed
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// Cancels a canvas loop. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Rc<Cell<bool>>,
}

impl StopHandle {
    /// Request the loop to stop before its next iteration
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    /// Whether stop was requested
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

/// Input from the host environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Animation frame with its timestamp in milliseconds
    Frame(f64),
    /// Viewport size or pixel density changed
    Resize(Viewport),
    /// Pointer moved to CSS pixel coordinates
    PointerMove {
        /// X from the left edge
        x: f64,
        /// Y from the top edge
        y: f64,
    },
    /// Click-style pointer event at CSS pixel coordinates
    Pointer {
        /// Event kind
        event: PointerEvent,
        /// X from the left edge
        x: f64,
        /// Y from the top edge
        y: f64,
    },
    /// The host is going away
    Close,
}

/// Host element that receives the canvas surface
pub trait MountTarget {
    /// Take the surface into the host's display
    fn insert_surface(&mut self, surface: &dyn RenderSurface);
}

/// Assembled scene with camera, surface and interaction state
pub struct Canvas<S: RenderSurface> {
    graph: SceneGraph,
    root: NodeId,
    camera: Camera,
    surface: S,
    reconciler: Reconciler,
    assets: AssetStore,
    config: StageConfig,
    hover: HoverSet,
    pointer: PointerState,
    viewport: Viewport,
    stop: StopHandle,
    mounted: bool,
    frames: u64,
}

impl<S: RenderSurface> Canvas<S> {
    pub(crate) fn assemble(
        mut graph: SceneGraph,
        reconciler: Reconciler,
        assets: AssetStore,
        config: StageConfig,
        roots: impl IntoIterator<Item = NodeId>,
        mut surface: S,
        viewport: Viewport,
    ) -> Result<Self, CanvasError> {
        let root = graph.insert(Object3D::new(ObjectKind::Scene));
        for id in roots {
            if !graph.add_child(root, id) {
                warn!("assemble: cannot attach top-level node {id:?}");
            }
        }

        let camera = Camera::from_config(&config.camera, viewport.aspect());
        let settings = surface.settings_mut();
        settings.tone_mapping = config.surface.tone_mapping;
        settings.output_color_space = config.surface.output_color_space;

        let mut canvas = Self {
            graph,
            root,
            camera,
            surface,
            reconciler,
            assets,
            config,
            hover: HoverSet::new(),
            pointer: PointerState::new(viewport.width, viewport.height),
            viewport,
            stop: StopHandle::default(),
            mounted: false,
            frames: 0,
        };
        canvas.resize(viewport)?;
        info!(
            "assembled canvas: {} nodes, {}x{} viewport",
            canvas.graph.len(),
            viewport.width,
            viewport.height
        );
        Ok(canvas)
    }

    /// Scene root
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node arena
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable node arena
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Output surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable output surface
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Nodes currently under the pointer
    pub fn hover(&self) -> &HoverSet {
        &self.hover
    }

    /// Current host viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Configuration the canvas was assembled with
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Assets carried over from the stage
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Handle that stops [`Canvas::run`]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether the loop was stopped
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Hand the surface to the host. Only the first call succeeds.
    pub fn mount(&mut self, target: &mut dyn MountTarget) -> Result<(), CanvasError> {
        if self.mounted {
            return Err(CanvasError::AlreadyMounted);
        }
        target.insert_surface(&self.surface);
        self.mounted = true;
        debug!("canvas surface mounted");
        Ok(())
    }

    /// Apply attributes to a live node
    pub fn apply(&mut self, id: NodeId, descriptor: &Descriptor) -> bool {
        match self.graph.get_mut(id) {
            Some(node) => {
                self.reconciler.apply(node, descriptor);
                true
            }
            None => {
                warn!("apply: node {id:?} does not exist");
                false
            }
        }
    }

    /// Apply attributes to the camera (`fov`, `position`, ...)
    pub fn apply_camera(&mut self, descriptor: &Descriptor) {
        self.reconciler.apply(&mut self.camera, descriptor);
    }

    /// Apply attributes to the surface settings (`toneMapping`, `outputEncoding`, ...)
    pub fn apply_surface(&mut self, descriptor: &Descriptor) {
        self.reconciler.apply(self.surface.settings_mut(), descriptor);
    }

    /// Resize the camera and surface, then notify every `onResize` node with
    /// the viewport size in world units at the camera's distance to the origin.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), CanvasError> {
        self.viewport = viewport;
        self.camera.set_viewport(viewport.width as f32, viewport.height as f32);
        let pixel_ratio = self.config.surface.clamp_pixel_ratio(viewport.device_pixel_ratio);
        self.surface.resize(viewport.width, viewport.height, pixel_ratio)?;
        self.pointer.update_viewport(viewport.width, viewport.height);

        let world = self.camera.world_viewport();
        for id in self.graph.traverse(self.root) {
            if let Some(node) = self.graph.get_mut(id) {
                node.notify_resize(&world);
            }
        }
        info!(
            "resized to {}x{} at pixel ratio {pixel_ratio} ({:.3}x{:.3} world units)",
            viewport.width, viewport.height, world.width, world.height
        );
        Ok(())
    }

    /// Run one frame: every `render` callback depth-first, then draw.
    /// Does nothing once stopped.
    pub fn frame(&mut self, timestamp: f64) -> Result<(), CanvasError> {
        if self.is_stopped() {
            return Ok(());
        }
        for id in self.graph.traverse(self.root) {
            if let Some(node) = self.graph.get_mut(id) {
                node.tick(timestamp);
            }
        }
        self.surface.render(&self.graph, self.root, &self.camera)?;
        self.frames += 1;
        trace!("frame {} at {timestamp}", self.frames);
        Ok(())
    }

    /// Track a pointer move and reconcile the hover set. Returns how many
    /// handlers ran.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> usize {
        self.pointer.update_position(x, y);
        let hits = self.cast_pointer();
        self.hover.reconcile(&mut self.graph, &hits)
    }

    /// Fire a click-style event on the nearest node under `(x, y)`.
    /// Hover events are routed through [`Canvas::pointer_move`].
    pub fn pointer(&mut self, event: PointerEvent, x: f64, y: f64) -> bool {
        if matches!(event, PointerEvent::Over | PointerEvent::Out | PointerEvent::Move) {
            return self.pointer_move(x, y) > 0;
        }
        self.pointer.update_position(x, y);
        let hits = self.cast_pointer();
        dispatch_nearest(&mut self.graph, event, &hits)
    }

    fn cast_pointer(&self) -> Vec<Intersection> {
        let (ndc_x, ndc_y) = self.pointer.to_ndc();
        match self.camera.screen_to_world_ray(ndc_x, ndc_y) {
            Some(ray) => Raycaster::new(ray).intersect(&self.graph, self.root),
            None => {
                warn!("pointer at ({ndc_x}, {ndc_y}) produced no camera ray");
                Vec::new()
            }
        }
    }

    /// Handle one host event
    pub fn handle_event(&mut self, event: HostEvent) -> Result<(), CanvasError> {
        match event {
            HostEvent::Frame(timestamp) => self.frame(timestamp)?,
            HostEvent::Resize(viewport) => self.resize(viewport)?,
            HostEvent::PointerMove { x, y } => {
                self.pointer_move(x, y);
            }
            HostEvent::Pointer { event, x, y } => {
                self.pointer(event, x, y);
            }
            HostEvent::Close => self.stop.stop(),
        }
        Ok(())
    }

    /// Consume host events until they run out or the canvas is stopped.
    /// Returns how many events were handled.
    pub fn run(&mut self, events: impl IntoIterator<Item = HostEvent>) -> Result<usize, CanvasError> {
        info!("starting canvas loop");
        let mut handled = 0;
        for event in events {
            if self.is_stopped() {
                break;
            }
            self.handle_event(event)?;
            handled += 1;
        }
        info!("canvas loop finished after {handled} events");
        Ok(handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{MeshArgs, Stage};
    use crate::descriptor::{Element, PropValue};
    use crate::render::{HeadlessSurface, WorldViewport};
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn cube(stage: &mut Stage, name: &str, size: f32, z: f32, log: &Log) -> NodeId {
        let geometry = stage.box_geometry(Descriptor::new().args([size, size, size]));
        let material = stage.basic_material(Descriptor::new());
        let over = Rc::clone(log);
        let out = Rc::clone(log);
        stage.mesh(MeshArgs::new(geometry, material).with_descriptor(
            Descriptor::new()
                .with("name", name)
                .with("position-z", z)
                .with("onPointerOver", PropValue::on_pointer(move |n, _| over.borrow_mut().push(format!("over {}", n.name))))
                .with("onPointerOut", PropValue::on_pointer(move |n, _| out.borrow_mut().push(format!("out {}", n.name)))),
        ))
    }

    fn assemble(stage: Stage, roots: Vec<NodeId>) -> Canvas<HeadlessSurface> {
        stage.assemble(roots, HeadlessSurface::new(), Viewport::new(800, 600)).unwrap()
    }

    #[test]
    fn test_overlapping_shapes_enter_nearest_first() {
        let log: Log = Rc::default();
        let mut stage = Stage::new();
        let far = cube(&mut stage, "far", 2.0, 0.0, &log);
        let near = cube(&mut stage, "near", 1.0, 1.0, &log);
        let mut canvas = assemble(stage, vec![far, near]);

        canvas.pointer_move(400.0, 300.0);
        assert_eq!(*log.borrow(), ["over near", "over far"]);
        assert_eq!(canvas.hover().len(), 2);
        log.borrow_mut().clear();

        canvas.pointer_move(0.0, 0.0);
        let mut exits = log.borrow().clone();
        exits.sort();
        assert_eq!(exits, ["out far", "out near"]);
        assert!(canvas.hover().is_empty());
    }

    #[test]
    fn test_click_goes_to_nearest() {
        let log: Log = Rc::default();
        let mut stage = Stage::new();
        let far = cube(&mut stage, "far", 2.0, 0.0, &log);
        let near = cube(&mut stage, "near", 1.0, 1.0, &log);
        let clicks = Rc::clone(&log);
        stage.apply(
            far,
            &Descriptor::new().with("onClick", PropValue::on_pointer(move |n, _| clicks.borrow_mut().push(n.name.clone()))),
        );
        let mut canvas = assemble(stage, vec![far, near]);
        // The near cube has no click handler, so nothing fires
        assert!(!canvas.pointer(PointerEvent::Click, 400.0, 300.0));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_frame_ticks_depth_first_then_renders() {
        let log: Log = Rc::default();
        let mut stage = Stage::new();
        let ticking = |name: &str| {
            let log = Rc::clone(&log);
            Descriptor::new()
                .with("name", name)
                .with("render", PropValue::on_frame(move |n, t| log.borrow_mut().push(format!("{} {t}", n.name))))
        };
        let a = stage.axes_helper(ticking("a"));
        let b = stage.axes_helper(ticking("b"));
        let parent = stage.group([Element::Props(ticking("parent")), Element::Node(a), Element::Node(b)]);
        let mut canvas = assemble(stage, vec![parent]);

        canvas.frame(16.0).unwrap();
        assert_eq!(*log.borrow(), ["parent 16", "a 16", "b 16"]);
        assert_eq!(canvas.surface().frames().len(), 1);
        assert_eq!(canvas.surface().frames()[0].nodes, 4);
    }

    #[test]
    fn test_stop_ends_the_loop() {
        let mut stage = Stage::new();
        let node = stage.axes_helper(Descriptor::new());
        let mut canvas = assemble(stage, vec![node]);
        let handle = canvas.stop_handle();
        canvas.apply(
            node,
            &Descriptor::new().with("render", PropValue::on_frame(move |_, _| handle.stop())),
        );

        let handled = canvas
            .run([HostEvent::Frame(0.0), HostEvent::Frame(16.0), HostEvent::Frame(32.0)])
            .unwrap();
        assert_eq!(handled, 1);
        assert_eq!(canvas.frame_count(), 1);
        assert!(canvas.is_stopped());

        // Frames after stop are no-ops
        canvas.frame(48.0).unwrap();
        assert_eq!(canvas.frame_count(), 1);
    }

    #[test]
    fn test_close_event_stops() {
        let stage = Stage::new();
        let mut canvas = assemble(stage, vec![]);
        let handled = canvas.run([HostEvent::Close, HostEvent::Frame(0.0)]).unwrap();
        assert_eq!(handled, 1);
        assert_eq!(canvas.frame_count(), 0);
    }

    #[test]
    fn test_resize_notifies_world_viewport() {
        let seen: Rc<RefCell<Vec<WorldViewport>>> = Rc::default();
        let mut stage = Stage::new();
        let sink = Rc::clone(&seen);
        let node = stage.axes_helper(
            Descriptor::new().with("onResize", PropValue::on_resize(move |_, v| sink.borrow_mut().push(*v))),
        );
        let mut canvas = assemble(stage, vec![node]);

        let height = 2.0 * (75.0_f32.to_radians() / 2.0).tan() * 10.0;
        assert_eq!(seen.borrow().len(), 1);
        assert_relative_eq!(seen.borrow()[0].height, height, epsilon = 1e-4);
        assert_relative_eq!(seen.borrow()[0].width, height * 800.0 / 600.0, epsilon = 1e-4);

        canvas
            .resize(Viewport {
                width: 400,
                height: 400,
                device_pixel_ratio: 3.0,
            })
            .unwrap();
        assert_eq!(seen.borrow().len(), 2);
        assert_relative_eq!(seen.borrow()[1].aspect, 1.0);
        assert_relative_eq!(seen.borrow()[1].width, height, epsilon = 1e-4);
        assert_eq!(canvas.surface().drawing_buffer_size(), (800, 800));
        assert_relative_eq!(canvas.camera().aspect, 1.0);
    }

    #[test]
    fn test_assembly_applies_surface_config() {
        let mut canvas = assemble(Stage::new(), vec![]);
        let settings = canvas.surface().settings().clone();
        assert_eq!(settings.tone_mapping, crate::render::ToneMapping::AcesFilmic);

        canvas.apply_surface(&Descriptor::new().with("outputEncoding", 3000_u32));
        assert_eq!(canvas.surface().settings().output_color_space, crate::scene::ColorSpace::SrgbLinear);

        canvas.apply_camera(&Descriptor::new().with("fov", 50.0_f32));
        assert_relative_eq!(canvas.camera().fov, 50.0);
    }

    #[test]
    fn test_mount_once() {
        struct Host(usize);
        impl MountTarget for Host {
            fn insert_surface(&mut self, _surface: &dyn RenderSurface) {
                self.0 += 1;
            }
        }
        let mut canvas = assemble(Stage::new(), vec![]);
        let mut host = Host(0);
        canvas.mount(&mut host).unwrap();
        assert_eq!(canvas.mount(&mut host), Err(CanvasError::AlreadyMounted));
        assert_eq!(host.0, 1);
    }

    #[test]
    fn test_lost_surface_fails_frame() {
        let mut canvas = assemble(Stage::new(), vec![]);
        canvas.surface_mut().lose_context();
        assert_eq!(canvas.frame(0.0), Err(CanvasError::Surface(SurfaceError::Lost)));
    }
}
