use super::piece::{PieceKind, PieceRotation};

/// Occupancy matrix of one piece orientation.
///
/// The matrix is square (`size`×`size`, at most 4×4). Bit `x` of `rows[y]`
/// is set when the cell at column `x`, row `y` of the bounding box is part
/// of the piece. Row 0 is the top of the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMatrix {
    size: u8,
    rows: [u8; 4],
}

impl ShapeMatrix {
    /// Builds a matrix from rows of `#` (occupied) and `.` (empty).
    const fn parse<const N: usize>(art: [&str; N]) -> Self {
        assert!(matches!(N, 2..=4), "shape size must be between 2 and 4");
        let mut rows = [0; 4];
        let mut y = 0;
        while y < N {
            let line = art[y].as_bytes();
            assert!(line.len() == N, "shape rows must be square");
            let mut x = 0;
            while x < N {
                match line[x] {
                    b'#' => rows[y] |= 1 << x,
                    b'.' => {}
                    _ => panic!("shape cells must be '#' or '.'"),
                }
                x += 1;
            }
            y += 1;
        }
        #[expect(clippy::cast_possible_truncation)]
        let size = N as u8;
        Self { size, rows }
    }

    /// Side length of the bounding box.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size as usize
    }

    #[must_use]
    pub const fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < 4 && y < 4 && (self.rows[y] & (1 << x)) != 0
    }

    /// Index of the topmost row containing an occupied cell.
    #[must_use]
    pub const fn top_row(&self) -> usize {
        let mut y = 0;
        while y < 4 {
            if self.rows[y] != 0 {
                return y;
            }
            y += 1;
        }
        0
    }

    const fn count_cells(&self) -> u32 {
        self.rows[0].count_ones()
            + self.rows[1].count_ones()
            + self.rows[2].count_ones()
            + self.rows[3].count_ones()
    }

    /// Returns the `(x, y)` offsets of occupied cells, relative to the
    /// bounding-box origin, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let size = self.size();
        (0..size).flat_map(move |y| {
            (0..size).filter_map(move |x| {
                #[expect(clippy::cast_possible_truncation)]
                let offset = (x as i8, y as i8);
                self.is_occupied(x, y).then_some(offset)
            })
        })
    }
}

/// Returns the occupancy matrix for a piece kind in a rotation state.
#[must_use]
pub fn shape(kind: PieceKind, rotation: PieceRotation) -> &'static ShapeMatrix {
    &SHAPES[kind as usize][rotation.as_usize()]
}

const fn s<const N: usize>(art: [&str; N]) -> ShapeMatrix {
    ShapeMatrix::parse(art)
}

/// Orientation 0 is the spawn orientation; each following entry is one
/// quarter turn clockwise from the previous one.
const SHAPES: [[ShapeMatrix; 4]; PieceKind::LEN] = [
    // I
    [
        s(["....", "####", "....", "...."]),
        s(["..#.", "..#.", "..#.", "..#."]),
        s(["....", "....", "####", "...."]),
        s([".#..", ".#..", ".#..", ".#.."]),
    ],
    // O
    [
        s(["##", "##"]),
        s(["##", "##"]),
        s(["##", "##"]),
        s(["##", "##"]),
    ],
    // S
    [
        s([".##", "##.", "..."]),
        s([".#.", ".##", "..#"]),
        s(["...", ".##", "##."]),
        s(["#..", "##.", ".#."]),
    ],
    // Z
    [
        s(["##.", ".##", "..."]),
        s(["..#", ".##", ".#."]),
        s(["...", "##.", ".##"]),
        s([".#.", "##.", "#.."]),
    ],
    // J
    [
        s(["#..", "###", "..."]),
        s([".##", ".#.", ".#."]),
        s(["...", "###", "..#"]),
        s([".#.", ".#.", "##."]),
    ],
    // L
    [
        s(["..#", "###", "..."]),
        s([".#.", ".#.", ".##"]),
        s(["...", "###", "#.."]),
        s(["##.", ".#.", ".#."]),
    ],
    // T
    [
        s([".#.", "###", "..."]),
        s([".#.", ".##", ".#."]),
        s(["...", "###", ".#."]),
        s([".#.", "##.", ".#."]),
    ],
];

// Every orientation of every piece is a tetromino.
const _: () = {
    let mut kind = 0;
    while kind < PieceKind::LEN {
        let mut rotation = 0;
        while rotation < 4 {
            assert!(SHAPES[kind][rotation].count_cells() == 4);
            rotation += 1;
        }
        kind += 1;
    }
};
