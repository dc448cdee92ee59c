//! Identity registry: assigns stable ids and decoration slots to faces.
//!
//! Each frame, detections are matched greedily in input order against the
//! live tracks by a position/size similarity score. Unmatched detections
//! open new tracks; tracks that go unmatched are aged out after
//! `max_frames_missing` frames or `max_track_age` of wall time. A frame
//! with no usable detections clears the registry at once.
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use crate::shared::config_error::ConfigError;
use crate::shared::constants::{
    DEFAULT_MATCH_THRESHOLD, DEFAULT_MAX_FRAMES_MISSING, DEFAULT_MAX_SLOTS, DEFAULT_MAX_TRACK_AGE,
    DEFAULT_MIN_SIMILARITY,
};
use crate::shared::point::Point;

use super::detection::Detection;
use super::face_landmarks::FaceLandmarks;
use super::similarity::best_match;
use super::slot_pool::{allocate_slot, SlotAllocation};

const FIRST_ID: u64 = 1;

/// How a track claimed earlier in a frame is treated by later detections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Every detection searches all tracks, so two detections in one frame
    /// may resolve to the same track.
    #[default]
    Shared,
    /// A track matched once in a frame is skipped by later detections.
    Exclusive,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegistryConfig {
    pub max_slots: u32,
    pub match_threshold: f64,
    pub min_similarity: f64,
    pub max_frames_missing: u32,
    pub max_track_age: Duration,
    pub match_policy: MatchPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_SLOTS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_frames_missing: DEFAULT_MAX_FRAMES_MISSING,
            max_track_age: DEFAULT_MAX_TRACK_AGE,
            match_policy: MatchPolicy::default(),
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_slots == 0 {
            return Err(ConfigError::NoSlots);
        }
        if !(self.match_threshold.is_finite() && self.match_threshold > 0.0) {
            return Err(ConfigError::MatchThreshold(self.match_threshold));
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ConfigError::MinSimilarity(self.min_similarity));
        }
        Ok(())
    }
}

/// Persistent record of one face across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: u64,
    pub slot: u32,
    pub center: Point,
    pub size: f64,
    pub rotation: f64,
    pub landmarks: FaceLandmarks,
    pub frames_missing: u32,
    pub first_seen: Instant,
    pub last_seen: Instant,
}

/// A detection tagged with the identity it was resolved to.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedFace {
    pub id: u64,
    pub slot: u32,
    pub center: Point,
    pub size: f64,
    pub rotation: f64,
}

pub struct IdentityRegistry {
    config: RegistryConfig,
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
}

impl IdentityRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            tracks: BTreeMap::new(),
            next_id: FIRST_ID,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track(&self, id: u64) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Slots held by live tracks, ascending. Contains a repeat only after an
    /// overflow allocation.
    pub fn slots_in_use(&self) -> Vec<u32> {
        let mut slots: Vec<u32> = self.tracks.values().map(|t| t.slot).collect();
        slots.sort_unstable();
        slots
    }

    /// Drops every track and restarts id numbering.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.next_id = FIRST_ID;
    }

    pub fn process_detections(&mut self, detections: &[Detection]) -> Vec<TrackedFace> {
        self.process_detections_at(detections, Instant::now())
    }

    /// Resolves one frame's detections to identities, with `now` as the
    /// frame timestamp.
    ///
    /// Output order follows the input order of detections that carry a center.
    pub fn process_detections_at(
        &mut self,
        detections: &[Detection],
        now: Instant,
    ) -> Vec<TrackedFace> {
        let usable: Vec<(&Detection, Point)> = detections
            .iter()
            .filter_map(|d| d.center.map(|c| (d, c)))
            .collect();

        if usable.is_empty() {
            if !self.tracks.is_empty() {
                log::debug!("No faces in frame, clearing {} tracks", self.tracks.len());
            }
            self.tracks.clear();
            return Vec::new();
        }

        let mut matched: HashSet<u64> = HashSet::new();
        let mut output = Vec::with_capacity(usable.len());

        for (detection, center) in usable {
            let id = match self.find_match(&center, detection.size, &matched) {
                Some(id) => {
                    self.apply_match(id, detection, center, now);
                    id
                }
                None => self.create_track(detection, center, now),
            };
            matched.insert(id);
            if let Some(track) = self.tracks.get(&id) {
                output.push(TrackedFace {
                    id,
                    slot: track.slot,
                    center,
                    size: detection.size,
                    rotation: detection.rotation,
                });
            }
        }

        self.age_unmatched_tracks(&matched, now);
        output
    }

    fn find_match(&self, center: &Point, size: f64, claimed: &HashSet<u64>) -> Option<u64> {
        let exclusive = self.config.match_policy == MatchPolicy::Exclusive;
        let candidates = self
            .tracks
            .values()
            .filter(|t| !(exclusive && claimed.contains(&t.id)))
            .map(|t| (t.id, t.center, t.size));
        best_match(
            center,
            size,
            candidates,
            self.config.match_threshold,
            self.config.min_similarity,
        )
        .map(|(id, _)| id)
    }

    fn apply_match(&mut self, id: u64, detection: &Detection, center: Point, now: Instant) {
        if let Some(track) = self.tracks.get_mut(&id) {
            track.center = center;
            track.size = detection.size;
            track.rotation = detection.rotation;
            track.landmarks = detection.landmarks.clone();
            track.frames_missing = 0;
            track.last_seen = now;
        }
    }

    fn create_track(&mut self, detection: &Detection, center: Point, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let allocation = allocate_slot(self.tracks.values().map(|t| t.slot), self.config.max_slots);
        if let SlotAllocation::Overflow(slot) = allocation {
            log::warn!(
                "All {} slots in use, track {id} shares slot {slot}",
                self.config.max_slots
            );
        }
        let slot = allocation.slot();
        log::debug!("New track {id} in slot {slot}");

        self.tracks.insert(
            id,
            Track {
                id,
                slot,
                center,
                size: detection.size,
                rotation: detection.rotation,
                landmarks: detection.landmarks.clone(),
                frames_missing: 0,
                first_seen: now,
                last_seen: now,
            },
        );
        id
    }

    fn age_unmatched_tracks(&mut self, matched: &HashSet<u64>, now: Instant) {
        let max_missing = self.config.max_frames_missing;
        let max_age = self.config.max_track_age;
        self.tracks.retain(|id, track| {
            if matched.contains(id) {
                return true;
            }
            track.frames_missing += 1;
            let expired = track.frames_missing > max_missing
                || now.saturating_duration_since(track.last_seen) > max_age;
            if expired {
                log::debug!("Track {id} expired, slot {} released", track.slot);
            }
            !expired
        });
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
