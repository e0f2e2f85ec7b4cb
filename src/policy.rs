/// Maps the measured manual rate to the rate the engine should emit.
///
/// Above `min_cps + 1` the engine takes over at `target_cps`. In the one-click
/// band just above `min_cps` it mirrors the user. At or below `min_cps` it stands down.
pub fn output_cps(real_cps: u32, min_cps: u32, target_cps: u32) -> u32 {
    if real_cps > min_cps.saturating_add(1) {
        target_cps
    } else if real_cps > min_cps {
        real_cps
    } else {
        0
    }
}
