// chain/src/consensus/election.rs

//! Pure leader-election decision function: fixed priority list,
//! augmented by a liveness-and-length vote.

/// A reachable peer's self-reported status, as observed by polling
/// its `/status` endpoint (or populated locally for self).
#[derive(Clone, Debug)]
pub struct PeerStatus {
    pub hostname: String,
    pub chain_len: u64,
}

/// Elects a leader from the candidate pool of reachable replicas.
///
/// `priority` is the fixed, cluster-wide ordered list of hostnames.
/// `reachable` is the set of replicas that answered `/status` this
/// round (including self). The pool is sorted by `(chain length
/// descending, priority ascending)`; the head is the leader. Ties
/// break deterministically in favor of whichever hostname comes first
/// in `priority`. An empty `reachable` set elects `self_hostname`.
pub fn elect_leader(priority: &[String], reachable: &[PeerStatus], self_hostname: &str) -> String {
    if reachable.is_empty() {
        return self_hostname.to_string();
    }

    let priority_rank = |hostname: &str| -> usize {
        priority
            .iter()
            .position(|p| p == hostname)
            .unwrap_or(priority.len())
    };

    let mut pool: Vec<&PeerStatus> = reachable.iter().collect();
    pool.sort_by(|a, b| {
        b.chain_len
            .cmp(&a.chain_len)
            .then_with(|| priority_rank(&a.hostname).cmp(&priority_rank(&b.hostname)))
    });

    pool[0].hostname.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(hostname: &str, len: u64) -> PeerStatus {
        PeerStatus {
            hostname: hostname.to_string(),
            chain_len: len,
        }
    }

    #[test]
    fn empty_pool_self_elects() {
        let leader = elect_leader(&[], &[], "r1");
        assert_eq!(leader, "r1");
    }

    #[test]
    fn longest_chain_wins() {
        let priority = vec!["r1".to_string(), "r2".to_string(), "r3".to_string()];
        let reachable = vec![status("r1", 3), status("r2", 5), status("r3", 1)];
        assert_eq!(elect_leader(&priority, &reachable, "r1"), "r2");
    }

    #[test]
    fn ties_break_by_priority_order() {
        let priority = vec!["r2".to_string(), "r1".to_string(), "r3".to_string()];
        let reachable = vec![status("r1", 4), status("r2", 4), status("r3", 4)];
        assert_eq!(elect_leader(&priority, &reachable, "r1"), "r2");
    }

    #[test]
    fn hostname_outside_priority_list_ranks_last() {
        let priority = vec!["r1".to_string()];
        let reachable = vec![status("r1", 2), status("unlisted", 2)];
        assert_eq!(elect_leader(&priority, &reachable, "r1"), "r1");
    }
}
