//! Follow/party coordination (C9): one "following" edge per player, any
//! number of "followed by" edges, NPC leaders auto-accept.

use dashmap::DashMap;

use crate::error::FollowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderKind {
    Player,
    Npc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowingView {
    pub leader: Option<String>,
    pub followers: Vec<String>,
}

/// Tracks follow edges and pending player-leader requests. Room membership
/// is supplied by the caller at request/accept time rather than cached
/// here, since it can change between the two.
pub struct FollowCoordinator {
    following: DashMap<String, String>,
    followers: DashMap<String, Vec<String>>,
    pending: DashMap<(String, String), ()>,
}

impl FollowCoordinator {
    pub fn new() -> Self {
        Self {
            following: DashMap::new(),
            followers: DashMap::new(),
            pending: DashMap::new(),
        }
    }

    fn link(&self, follower: &str, leader: &str) {
        if let Some(previous) = self.following.insert(follower.to_string(), leader.to_string()) {
            self.unlink_follower(&previous, follower);
        }
        self.followers.entry(leader.to_string()).or_default().push(follower.to_string());
    }

    fn unlink_follower(&self, leader: &str, follower: &str) {
        if let Some(mut list) = self.followers.get_mut(leader) {
            list.retain(|f| f != follower);
        }
    }

    /// A follow request against a leader present in the same room.
    /// NPC leaders accept immediately; player leaders are recorded pending
    /// until [`accept`]/[`reject`].
    pub fn request(
        &self,
        follower: &str,
        leader: &str,
        leader_kind: LeaderKind,
        both_in_room: bool,
    ) -> Result<bool, FollowError> {
        if follower == leader {
            return Err(FollowError::SelfFollow);
        }
        if !both_in_room {
            return Err(FollowError::LeaderNotInRoom);
        }

        match leader_kind {
            LeaderKind::Npc => {
                self.link(follower, leader);
                Ok(true)
            }
            LeaderKind::Player => {
                self.pending.insert((follower.to_string(), leader.to_string()), ());
                Ok(false)
            }
        }
    }

    pub fn accept(&self, follower: &str, leader: &str, both_in_room: bool) -> Result<(), FollowError> {
        self.pending
            .remove(&(follower.to_string(), leader.to_string()))
            .ok_or(FollowError::RequestNotPending)?;
        if !both_in_room {
            return Err(FollowError::LeaderNotInRoom);
        }
        self.link(follower, leader);
        Ok(())
    }

    pub fn reject(&self, follower: &str, leader: &str) -> Result<(), FollowError> {
        self.pending
            .remove(&(follower.to_string(), leader.to_string()))
            .ok_or(FollowError::RequestNotPending)?;
        Ok(())
    }

    pub fn unfollow(&self, follower: &str) -> Result<String, FollowError> {
        let (_, leader) = self.following.remove(follower).ok_or(FollowError::NotFollowing)?;
        self.unlink_follower(&leader, follower);
        Ok(leader)
    }

    pub fn following_view(&self, player_id: &str) -> FollowingView {
        FollowingView {
            leader: self.following.get(player_id).map(|e| e.value().clone()),
            followers: self.followers.get(player_id).map(|l| l.clone()).unwrap_or_default(),
        }
    }

    /// Followers of `leader_id` who are currently in `leader_room_id` and
    /// should attempt the same movement. Callers silently skip a follower
    /// whose movement attempt fails (no exit, in combat, grace period).
    pub fn followers_in_room(&self, leader_id: &str, followers_present: &[String]) -> Vec<String> {
        let all = self.followers.get(leader_id).map(|l| l.clone()).unwrap_or_default();
        all.into_iter().filter(|f| followers_present.contains(f)).collect()
    }
}

impl Default for FollowCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_yourself_is_rejected() {
        let coordinator = FollowCoordinator::new();
        let err = coordinator.request("a", "a", LeaderKind::Player, true).unwrap_err();
        assert_eq!(err, FollowError::SelfFollow);
    }

    #[test]
    fn npc_leader_accepts_immediately() {
        let coordinator = FollowCoordinator::new();
        let accepted = coordinator.request("a", "rat-1", LeaderKind::Npc, true).unwrap();
        assert!(accepted);
        assert_eq!(coordinator.following_view("a").leader, Some("rat-1".to_string()));
        assert_eq!(coordinator.following_view("rat-1").followers, vec!["a".to_string()]);
    }

    #[test]
    fn player_leader_requires_accept() {
        let coordinator = FollowCoordinator::new();
        let accepted = coordinator.request("a", "b", LeaderKind::Player, true).unwrap();
        assert!(!accepted);
        assert!(coordinator.following_view("a").leader.is_none());

        coordinator.accept("a", "b", true).unwrap();
        assert_eq!(coordinator.following_view("a").leader, Some("b".to_string()));
    }

    #[test]
    fn rejecting_clears_the_pending_request() {
        let coordinator = FollowCoordinator::new();
        coordinator.request("a", "b", LeaderKind::Player, true).unwrap();
        coordinator.reject("a", "b").unwrap();
        assert_eq!(
            coordinator.accept("a", "b", true).unwrap_err(),
            FollowError::RequestNotPending
        );
    }

    #[test]
    fn unfollow_clears_both_sides() {
        let coordinator = FollowCoordinator::new();
        coordinator.request("a", "rat-1", LeaderKind::Npc, true).unwrap();
        coordinator.unfollow("a").unwrap();
        assert!(coordinator.following_view("a").leader.is_none());
        assert!(coordinator.following_view("rat-1").followers.is_empty());
    }

    #[test]
    fn re_following_a_new_leader_drops_the_old_edge() {
        let coordinator = FollowCoordinator::new();
        coordinator.request("a", "rat-1", LeaderKind::Npc, true).unwrap();
        coordinator.request("a", "rat-2", LeaderKind::Npc, true).unwrap();
        assert!(coordinator.following_view("rat-1").followers.is_empty());
        assert_eq!(coordinator.following_view("rat-2").followers, vec!["a".to_string()]);
    }
}
