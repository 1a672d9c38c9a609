//! Fan-out of serialized frames to room occupants.

use super::connection::ConnectionId;
use super::registry::Occupant;

/// Whether a broadcast should hand the frame to this occupant.
///
/// Excluded and closed connections are skipped.
pub fn should_deliver(occupant: &Occupant, exclude: Option<ConnectionId>) -> bool {
    Some(occupant.connection_id()) != exclude && occupant.connection.is_open()
}

/// Queue `frame` on every eligible occupant.
///
/// Delivery is fire-and-forget: a connection that closes between the check
/// and the send simply misses the frame. Returns the number of connections
/// the frame was queued on.
pub fn deliver<'a, I>(members: I, frame: &str, exclude: Option<ConnectionId>) -> usize
where
    I: IntoIterator<Item = &'a Occupant>,
{
    members
        .into_iter()
        .filter(|occupant| should_deliver(occupant, exclude))
        .filter(|occupant| occupant.connection.send(frame))
        .count()
}
