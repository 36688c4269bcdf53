use crate::error::{MazeError, Result};
use crate::grid::Maze;

/// Collision label carried by every body the layout describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyTag {
    Ball,
    Goal,
    Wall,
    Boundary,
}

impl BodyTag {
    pub fn label(self) -> &'static str {
        match self {
            BodyTag::Ball => "ball",
            BodyTag::Goal => "goal",
            BodyTag::Wall => "wall",
            BodyTag::Boundary => "boundary",
        }
    }

    pub fn from_label(label: &str) -> Option<BodyTag> {
        match label {
            "ball" => Some(BodyTag::Ball),
            "goal" => Some(BodyTag::Goal),
            "wall" => Some(BodyTag::Wall),
            "boundary" => Some(BodyTag::Boundary),
            _ => None,
        }
    }
}

/// Axis-aligned rectangle given by its centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub tag: BodyTag,
}

impl Rect {
    pub fn min(&self) -> (f64, f64) {
        (self.x - self.width / 2.0, self.y - self.height / 2.0)
    }

    pub fn max(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub tag: BodyTag,
}

/// Play area in pixel units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    width: f64,
    height: f64,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(MazeError::invalid(format!(
                "play area must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryParams {
    pub wall_thickness: f64,
    pub boundary_thickness: f64,
    pub goal_ratio: f64,
    pub ball_ratio: f64,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            wall_thickness: 3.0,
            boundary_thickness: 2.0,
            goal_ratio: 0.7,
            ball_ratio: 0.3,
        }
    }
}

impl GeometryParams {
    pub fn validate(&self) -> Result<()> {
        let thick_ok = |t: f64| t.is_finite() && t > 0.0;
        let ratio_ok = |r: f64| r.is_finite() && r > 0.0 && r <= 1.0;
        if !thick_ok(self.wall_thickness) || !thick_ok(self.boundary_thickness) {
            return Err(MazeError::invalid("wall thickness must be positive"));
        }
        if !ratio_ok(self.goal_ratio) || !ratio_ok(self.ball_ratio) {
            return Err(MazeError::invalid("goal and ball ratios must lie in (0, 1]"));
        }
        Ok(())
    }
}

/// Everything needed to populate a physics world for one maze.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub unit_x: f64,
    pub unit_y: f64,
    pub boundaries: [Rect; 4],
    pub walls: Vec<Rect>,
    pub goal: Rect,
    pub ball: Circle,
}

/// One rectangle per closed passage. Horizontal passages become walls lying
/// along the bottom edge of their upper cell; vertical passages become walls
/// standing on the right edge of their left cell.
pub fn wall_segments(maze: &Maze, unit_x: f64, unit_y: f64, thickness: f64) -> Result<Vec<Rect>> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(unit_x) || !positive(unit_y) {
        return Err(MazeError::invalid(format!(
            "cell size must be positive, got {unit_x}x{unit_y}"
        )));
    }
    if !positive(thickness) {
        return Err(MazeError::invalid("wall thickness must be positive"));
    }
    let mut walls = Vec::new();

    for (row, col, open) in maze.horizontals() {
        if open {
            continue;
        }
        walls.push(Rect {
            x: col as f64 * unit_x + unit_x / 2.0,
            y: row as f64 * unit_y + unit_y,
            width: unit_x,
            height: thickness,
            tag: BodyTag::Wall,
        });
    }

    for (row, col, open) in maze.verticals() {
        if open {
            continue;
        }
        walls.push(Rect {
            x: col as f64 * unit_x + unit_x,
            y: row as f64 * unit_y + unit_y / 2.0,
            width: thickness,
            height: unit_y,
            tag: BodyTag::Wall,
        });
    }

    Ok(walls)
}

fn boundaries(arena: Arena, t: f64) -> [Rect; 4] {
    let (w, h) = (arena.width, arena.height);
    let edge = |x, y, width, height| Rect {
        x,
        y,
        width,
        height,
        tag: BodyTag::Boundary,
    };
    [
        edge(w / 2.0, 0.0, w, t),
        edge(w / 2.0, h, w, t),
        edge(0.0, h / 2.0, t, h),
        edge(w, h / 2.0, t, h),
    ]
}

/// Maps a finished maze onto the arena: maze walls, the four arena edges, the
/// goal in the bottom-right cell and the ball in the top-left cell.
pub fn build_layout(maze: &Maze, arena: Arena, params: &GeometryParams) -> Result<Layout> {
    params.validate()?;
    let dims = maze.dims();
    let unit_x = arena.width / dims.cells_horizontal() as f64;
    let unit_y = arena.height / dims.cells_vertical() as f64;

    let goal = Rect {
        x: arena.width - unit_x / 2.0,
        y: arena.height - unit_y / 2.0,
        width: unit_x * params.goal_ratio,
        height: unit_y * params.goal_ratio,
        tag: BodyTag::Goal,
    };
    let ball = Circle {
        x: unit_x / 2.0,
        y: unit_y / 2.0,
        radius: unit_x.min(unit_y) * params.ball_ratio,
        tag: BodyTag::Ball,
    };

    Ok(Layout {
        unit_x,
        unit_y,
        boundaries: boundaries(arena, params.boundary_thickness),
        walls: wall_segments(maze, unit_x, unit_y, params.wall_thickness)?,
        goal,
        ball,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Dimensions;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn all_closed_emits_every_wall() {
        let dims = Dimensions::new(5, 4).unwrap();
        let maze = Maze::closed(dims);
        let layout = build_layout(&maze, Arena::new(500.0, 400.0).unwrap(), &GeometryParams::default())
            .unwrap();
        assert_eq!(layout.walls.len(), (4 - 1) * 5 + 4 * (5 - 1));
        assert_eq!(layout.boundaries.len(), 4);
        assert!(layout.walls.iter().all(|w| w.tag == BodyTag::Wall));
        assert!(layout.boundaries.iter().all(|w| w.tag == BodyTag::Boundary));
    }

    #[test]
    fn wall_positions_follow_passage_indices() {
        // 3 wide, 2 tall: one horizontal row of 3, two vertical rows of 2.
        let dims = Dimensions::new(3, 2).unwrap();
        let maze = Maze::from_tables(
            dims,
            &[vec![true, true], vec![true, false]],
            &[vec![true, false, true]],
        )
        .unwrap();
        let walls = wall_segments(&maze, 10.0, 20.0, 3.0).unwrap();
        assert_eq!(walls.len(), 2);

        // horizontal (row 0, col 1)
        let h = walls[0];
        assert!(close(h.x, 15.0) && close(h.y, 20.0));
        assert!(close(h.width, 10.0) && close(h.height, 3.0));

        // vertical (row 1, col 1)
        let v = walls[1];
        assert!(close(v.x, 20.0) && close(v.y, 30.0));
        assert!(close(v.width, 3.0) && close(v.height, 20.0));
    }

    #[test]
    fn goal_ball_and_edges() {
        let dims = Dimensions::new(4, 2).unwrap();
        let layout = build_layout(
            &Maze::closed(dims),
            Arena::new(400.0, 100.0).unwrap(),
            &GeometryParams::default(),
        )
        .unwrap();
        assert!(close(layout.unit_x, 100.0) && close(layout.unit_y, 50.0));

        let g = layout.goal;
        assert_eq!(g.tag, BodyTag::Goal);
        assert!(close(g.x, 350.0) && close(g.y, 75.0));
        assert!(close(g.width, 70.0) && close(g.height, 35.0));

        let b = layout.ball;
        assert_eq!(b.tag, BodyTag::Ball);
        assert!(close(b.x, 50.0) && close(b.y, 25.0));
        assert!(close(b.radius, 15.0));

        let [top, bottom, left, right] = layout.boundaries;
        assert!(close(top.y, 0.0) && close(top.width, 400.0) && close(top.height, 2.0));
        assert!(close(bottom.y, 100.0));
        assert!(close(left.x, 0.0) && close(left.height, 100.0) && close(left.width, 2.0));
        assert!(close(right.x, 400.0) && close(right.y, 50.0));
    }

    #[test]
    fn bad_arena_and_params_rejected() {
        assert!(Arena::new(0.0, 10.0).is_err());
        assert!(Arena::new(10.0, f64::NAN).is_err());
        let maze = Maze::closed(Dimensions::new(2, 2).unwrap());
        let arena = Arena::new(10.0, 10.0).unwrap();
        let params = GeometryParams {
            goal_ratio: 1.5,
            ..GeometryParams::default()
        };
        assert!(matches!(
            build_layout(&maze, arena, &params),
            Err(MazeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn wall_segments_rejects_degenerate_sizes() {
        let maze = Maze::closed(Dimensions::new(2, 2).unwrap());
        for (ux, uy, t) in [
            (-10.0, 20.0, 3.0),
            (10.0, 0.0, 3.0),
            (f64::NAN, 20.0, 3.0),
            (10.0, f64::INFINITY, 3.0),
            (10.0, 20.0, -3.0),
            (10.0, 20.0, f64::NAN),
        ] {
            assert!(
                matches!(
                    wall_segments(&maze, ux, uy, t),
                    Err(MazeError::InvalidDimensions { .. })
                ),
                "accepted {ux}, {uy}, {t}"
            );
        }
    }

    #[test]
    fn labels_round_trip_and_unknown_is_none() {
        for tag in [BodyTag::Ball, BodyTag::Goal, BodyTag::Wall, BodyTag::Boundary] {
            assert_eq!(BodyTag::from_label(tag.label()), Some(tag));
        }
        assert_eq!(BodyTag::from_label("ghost"), None);
    }

    #[test]
    fn rect_extents() {
        let r = Rect {
            x: 10.0,
            y: 20.0,
            width: 4.0,
            height: 6.0,
            tag: BodyTag::Wall,
        };
        assert_eq!(r.min(), (8.0, 17.0));
        assert_eq!(r.max(), (12.0, 23.0));
    }
}
