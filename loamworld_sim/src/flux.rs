// Bounded greedy flux allocation.
//
// `update_water` produces a tentative per-face outflow from the pressure
// model; this module rations it against the water the cell actually holds.
// The policy is a greedy multi-way rationing, not a proportional split: the
// face with the steepest tentative flux is served first and in full if
// possible, so outflow biases toward the strongest gradient.
//
// **Invariant:** the committed total never exceeds the water available when
// allocation starts, and every committed value is non-negative. Water moves
// out of the cell here, at commit time — transport later only *adds* the
// committed amounts to neighbours, which is what makes a closed grid
// conserve mass.

use crate::types::FACE_COUNT;

/// Ration `tentative` per-face outflow against `*water`.
///
/// Negative tentative values (inward pressure) are clamped to zero — water
/// never flows "inward" through this mechanism. Faces are then committed in
/// descending order of tentative magnitude: the full amount while water
/// lasts, the remainder on the face that exhausts it. `*water` is reduced by
/// the committed total. Returns the committed per-face flux.
pub fn allocate(tentative: [f32; FACE_COUNT], water: &mut f32) -> [f32; FACE_COUNT] {
    let mut remaining = tentative.map(|f| f.max(0.0));
    let mut committed = [0.0f32; FACE_COUNT];

    while *water > 0.0 {
        // Face with the steepest remaining tentative flux.
        let mut best = 0;
        for face in 1..FACE_COUNT {
            if remaining[face] > remaining[best] {
                best = face;
            }
        }
        if remaining[best] <= 0.0 {
            break;
        }

        if *water > remaining[best] {
            committed[best] = remaining[best];
            *water -= remaining[best];
            remaining[best] = 0.0;
        } else {
            committed[best] = *water;
            *water = 0.0;
        }
    }

    committed
}
