//! Wall-kick offset tables.
//!
//! Offsets are `(dx, dy)` with x growing rightward and y growing downward.
//! For a rotation from one state to another, the candidates are tried in
//! order and the first offset that places the rotated piece at a valid
//! position wins.

use super::piece::{PieceKind, PieceRotation};

/// A candidate translation applied to a rotated piece.
pub type KickOffset = (i8, i8);

/// `[from][to]` rotation-state transitions. Only quarter turns are reachable;
/// the diagonal and half-turn entries stay empty.
type KickTable = [[&'static [KickOffset]; 4]; 4];

const NONE: &[KickOffset] = &[];
const IN_PLACE: &[KickOffset] = &[(0, 0)];

const JLSTZ_0_1: &[KickOffset] = &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)];
const JLSTZ_1_0: &[KickOffset] = &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)];
const JLSTZ_1_2: &[KickOffset] = &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)];
const JLSTZ_2_1: &[KickOffset] = &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)];
const JLSTZ_2_3: &[KickOffset] = &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)];
const JLSTZ_3_2: &[KickOffset] = &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)];
const JLSTZ_3_0: &[KickOffset] = &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)];
const JLSTZ_0_3: &[KickOffset] = &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)];

const I_0_1: &[KickOffset] = &[(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)];
const I_1_0: &[KickOffset] = &[(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)];
const I_1_2: &[KickOffset] = &[(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)];
const I_2_1: &[KickOffset] = &[(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)];
const I_2_3: &[KickOffset] = &[(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)];
const I_3_2: &[KickOffset] = &[(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)];
const I_3_0: &[KickOffset] = &[(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)];
const I_0_3: &[KickOffset] = &[(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)];

const I_KICKS: KickTable = [
    [NONE, I_0_1, NONE, I_0_3],
    [I_1_0, NONE, I_1_2, NONE],
    [NONE, I_2_1, NONE, I_2_3],
    [I_3_0, NONE, I_3_2, NONE],
];

const O_KICKS: KickTable = [
    [NONE, IN_PLACE, NONE, IN_PLACE],
    [IN_PLACE, NONE, IN_PLACE, NONE],
    [NONE, IN_PLACE, NONE, IN_PLACE],
    [IN_PLACE, NONE, IN_PLACE, NONE],
];

const JLSTZ_KICKS: KickTable = [
    [NONE, JLSTZ_0_1, NONE, JLSTZ_0_3],
    [JLSTZ_1_0, NONE, JLSTZ_1_2, NONE],
    [NONE, JLSTZ_2_1, NONE, JLSTZ_2_3],
    [JLSTZ_3_0, NONE, JLSTZ_3_2, NONE],
];

// One slot per piece; the JLSTZ pieces currently share the same values.
const S_KICKS: KickTable = JLSTZ_KICKS;
const Z_KICKS: KickTable = JLSTZ_KICKS;
const J_KICKS: KickTable = JLSTZ_KICKS;
const L_KICKS: KickTable = JLSTZ_KICKS;
const T_KICKS: KickTable = JLSTZ_KICKS;

/// Indexed by `PieceKind as usize`.
const KICK_TABLES: [KickTable; PieceKind::LEN] =
    [I_KICKS, O_KICKS, S_KICKS, Z_KICKS, J_KICKS, L_KICKS, T_KICKS];

/// Returns the ordered kick candidates for rotating `kind` from `from` to `to`.
///
/// Returns an empty slice for transitions that are not quarter turns.
#[must_use]
pub fn kick_offsets(
    kind: PieceKind,
    from: PieceRotation,
    to: PieceRotation,
) -> &'static [KickOffset] {
    KICK_TABLES[kind as usize][from.as_usize()][to.as_usize()]
}

// Every quarter-turn transition must offer at least the in-place candidate.
const _: () = {
    let mut kind = 0;
    while kind < PieceKind::LEN {
        let mut from = 0;
        while from < 4 {
            let offsets = [
                KICK_TABLES[kind][from][(from + 1) % 4],
                KICK_TABLES[kind][from][(from + 3) % 4],
            ];
            let mut i = 0;
            while i < offsets.len() {
                let candidates = offsets[i];
                assert!(!candidates.is_empty());
                let mut has_in_place = false;
                let mut j = 0;
                while j < candidates.len() {
                    if candidates[j].0 == 0 && candidates[j].1 == 0 {
                        has_in_place = true;
                    }
                    j += 1;
                }
                assert!(has_in_place);
                i += 1;
            }
            from += 1;
        }
        kind += 1;
    }
};
