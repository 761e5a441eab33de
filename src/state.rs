/// Where the station is in its life cycle.
///
/// `Init -> Calibrating -> Running`, or `Init -> Running` when stored offsets
/// were applied. `Fatal` is only reachable from `Init` and is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    #[default]
    Init,
    Calibrating,
    Running,
    Fatal,
}
