use core::{fmt, ops::Sub, str::FromStr};

/// A 2D position in surface pixels, y growing downwards.
///
/// Also used for displacement vectors between two positions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Buckets a displacement vector into a cardinal direction.
    ///
    /// A branch only fires when the vector's component along that axis beats
    /// `slope_intolerance` times the other component. Returns `None` for the zero
    /// vector and for vectors sitting exactly on a bucket boundary.
    pub fn classify(delta: Point, slope_intolerance: f32) -> Option<Self> {
        let Point { x, y } = delta;
        if -y > slope_intolerance * x.abs() {
            Some(Direction::Up)
        } else if y > slope_intolerance * x.abs() {
            Some(Direction::Down)
        } else if -x > slope_intolerance * y.abs() {
            Some(Direction::Left)
        } else if x > slope_intolerance * y.abs() {
            Some(Direction::Right)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

/// Discrete gesture state of one contact slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureState {
    #[default]
    None,
    Down,
    Up,
    HoldDown,
    DoubleTap,
    Swipe(Direction),
    Move(Direction),
}

impl GestureState {
    pub const ALL: [GestureState; 13] = [
        GestureState::None,
        GestureState::Swipe(Direction::Up),
        GestureState::Swipe(Direction::Down),
        GestureState::Swipe(Direction::Left),
        GestureState::Swipe(Direction::Right),
        GestureState::HoldDown,
        GestureState::Down,
        GestureState::Up,
        GestureState::Move(Direction::Up),
        GestureState::Move(Direction::Down),
        GestureState::Move(Direction::Left),
        GestureState::Move(Direction::Right),
        GestureState::DoubleTap,
    ];

    /// Stable numeric code, matching the index into [`GestureState::ALL`].
    pub fn code(self) -> u8 {
        match self {
            GestureState::None => 0,
            GestureState::Swipe(Direction::Up) => 1,
            GestureState::Swipe(Direction::Down) => 2,
            GestureState::Swipe(Direction::Left) => 3,
            GestureState::Swipe(Direction::Right) => 4,
            GestureState::HoldDown => 5,
            GestureState::Down => 6,
            GestureState::Up => 7,
            GestureState::Move(Direction::Up) => 8,
            GestureState::Move(Direction::Down) => 9,
            GestureState::Move(Direction::Left) => 10,
            GestureState::Move(Direction::Right) => 11,
            GestureState::DoubleTap => 12,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Swipes and double-taps only last for the settle window before collapsing to `Up`.
    pub fn is_transient(self) -> bool {
        matches!(self, GestureState::Swipe(_) | GestureState::DoubleTap)
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureState::None => f.write_str("NONE"),
            GestureState::Down => f.write_str("DOWN"),
            GestureState::Up => f.write_str("UP"),
            GestureState::HoldDown => f.write_str("HOLD DOWN"),
            GestureState::DoubleTap => f.write_str("DOUBLE TAP"),
            GestureState::Swipe(direction) => write!(f, "SWIPE {}", direction.label()),
            GestureState::Move(direction) => write!(f, "MOVE {}", direction.label()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownStateLabel(pub String);

impl fmt::Display for UnknownStateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gesture state label `{}`", self.0)
    }
}

impl std::error::Error for UnknownStateLabel {}

impl FromStr for GestureState {
    type Err = UnknownStateLabel;

    /// Accepts the `Display` labels, with `_` or `-` in place of the space and any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | '-' => ' ',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        Self::ALL
            .into_iter()
            .find(|state| state.to_string() == normalized)
            .ok_or_else(|| UnknownStateLabel(s.trim().to_string()))
    }
}
