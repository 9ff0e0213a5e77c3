//! Track and tracked-shape types handed between the host task and formats.

/// Shape kinds a tracked annotation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeType {
    /// One or more points; ISI only uses the first (x, y) pair.
    #[default]
    Points,
}

impl ShapeType {
    /// Get the shape type as a string (for logs and error messages).
    pub fn name(&self) -> &'static str {
        match self {
            ShapeType::Points => "points",
        }
    }
}

/// Where a track came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackSource {
    /// Authored by hand in the host tool.
    #[default]
    Manual,
    /// Produced by an import plugin.
    Imported,
}

/// One observation of a track at a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedShape {
    /// Shape kind.
    pub shape_type: ShapeType,
    /// Frame number this observation belongs to.
    pub frame: u32,
    /// Flat coordinate list (`[x, y]` for a single point).
    pub points: Vec<f32>,
    /// The annotated object is hidden at this frame.
    pub occluded: bool,
    /// The object has left the frame; the track is inactive here.
    pub outside: bool,
    /// Position was explicitly authored rather than interpolated.
    pub keyframe: bool,
    /// Free-form per-shape attributes as `(name, value)` pairs.
    pub attributes: Vec<(String, String)>,
    /// Index of the owning track.
    pub track_id: usize,
}

impl TrackedShape {
    /// Create a visible keyframe point at `(x, y)`.
    pub fn point(frame: u32, x: f32, y: f32) -> Self {
        Self {
            shape_type: ShapeType::Points,
            frame,
            points: vec![x, y],
            occluded: false,
            outside: false,
            keyframe: true,
            attributes: Vec::new(),
            track_id: 0,
        }
    }

    /// Mark the shape as occluded.
    pub fn occluded(mut self, occluded: bool) -> Self {
        self.occluded = occluded;
        self
    }

    /// Mark the shape as outside the frame.
    pub fn outside(mut self, outside: bool) -> Self {
        self.outside = outside;
        self
    }

    /// Set the keyframe flag.
    pub fn keyframe(mut self, keyframe: bool) -> Self {
        self.keyframe = keyframe;
        self
    }

    /// First (x, y) pair, if the shape has one.
    pub fn first_point(&self) -> Option<(f32, f32)> {
        match self.points.as_slice() {
            [x, y, ..] => Some((*x, *y)),
            _ => None,
        }
    }
}

/// A labeled sequence of shapes following one object across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Label name.
    pub label: String,
    /// Group id (0 = ungrouped).
    pub group: u32,
    /// Origin of the track.
    pub source: TrackSource,
    /// Shapes ordered by frame.
    pub shapes: Vec<TrackedShape>,
}

impl Track {
    /// Create an empty manual track.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            group: 0,
            source: TrackSource::Manual,
            shapes: Vec::new(),
        }
    }

    /// Add a shape, keeping shapes sorted by frame.
    pub fn add_shape(&mut self, shape: TrackedShape) {
        let idx = self.shapes.partition_point(|s| s.frame <= shape.frame);
        self.shapes.insert(idx, shape);
    }
}
