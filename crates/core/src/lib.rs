//! Stable face identities and smoothed overlay poses for live video.
//!
//! Per frame: landmarks → [`detection::domain::detection::Detection`] →
//! [`detection::domain::identity_registry::IdentityRegistry`] →
//! [`overlay::domain::projection_engine::ProjectionEngine`] → poses for the
//! renderer. [`pipeline::track_faces_use_case::TrackFacesUseCase`] wires the
//! three together.

pub mod detection {
    pub mod domain {
        pub mod detection;
        pub mod face_landmarks;
        pub mod identity_registry;
        pub mod similarity;
        pub mod slot_pool;
    }
}

pub mod overlay {
    pub mod domain {
        pub mod cover_fit;
        pub mod pose_smoother;
        pub mod projection_engine;
        pub mod smoothed_pose;
    }
}

pub mod pipeline {
    pub mod infrastructure;
    pub mod pipeline_logger;
    pub mod track_faces_use_case;
}

pub mod shared {
    pub mod config_error;
    pub mod constants;
    pub mod display_geometry;
    pub mod point;
}
