//! Fixed sample dataset shown whenever live channel data is unavailable.

use crate::models::{FeedItem, Playlist, Video};

// (id, title, description, thumbnail)
const SAMPLE_VIDEOS: &[(&str, &str, &str, &str)] = &[
    (
        "mock1",
        "Mastering TypeScript Generics",
        "Unlock the full potential of TypeScript by mastering generics for creating reusable and type-safe components and functions.",
        "https://placehold.co/480x360/1a202c/718096.png?text=TypeScript",
    ),
    (
        "mock2",
        "Designing for the Future: AI in UX",
        "Explore how artificial intelligence is reshaping user experience design, from personalization to predictive interfaces.",
        "https://placehold.co/480x360/1a202c/718096.png?text=AI+in+UX",
    ),
    (
        "mock3",
        "The Art of Micro-interactions",
        "Discover how small, thoughtful animations and feedback can significantly improve the user experience and make your app feel alive.",
        "https://placehold.co/480x360/1a202c/718096.png?text=Micro-interactions",
    ),
    (
        "mock4",
        "React State Management in 2024",
        "A deep dive into modern state management libraries for React, including Zustand, Jotai, and Recoil. Which one is right for your project?",
        "https://placehold.co/480x360/1a202c/718096.png?text=React+State",
    ),
    (
        "mock5",
        "WebAssembly: The Next Frontier",
        "A look into the potential of WebAssembly (Wasm) to bring near-native performance to web applications.",
        "https://placehold.co/480x360/1a202c/718096.png?text=Wasm",
    ),
    (
        "mock6",
        "Building a Design System with Tailwind CSS",
        "Learn the fundamentals of creating a scalable and maintainable design system using the power of Tailwind CSS utility classes.",
        "https://placehold.co/480x360/1a202c/718096.png?text=Tailwind+CSS",
    ),
    (
        "mock7",
        "A Guide to Server-Side Rendering (SSR)",
        "Understand the benefits and trade-offs of SSR with frameworks like Next.js and Remix for better SEO and performance.",
        "https://placehold.co/480x360/1a202c/718096.png?text=SSR",
    ),
    (
        "mock8",
        "Accessibility in Modern Web Development",
        "Essential techniques and best practices for building inclusive web applications that are usable by everyone.",
        "https://placehold.co/480x360/1a202c/718096.png?text=A11y",
    ),
];

const SAMPLE_PLAYLISTS: &[(&str, &str, &str, &str)] = &[
    (
        "PL_mock1",
        "Getting Started with React",
        "A complete series for beginners to learn React from scratch, covering hooks, state, props, and more.",
        "https://placehold.co/480x360/2d3748/e2e8f0.png?text=React+Playlist",
    ),
    (
        "PL_mock2",
        "Advanced CSS Techniques",
        "Dive deep into modern CSS features like Grid, Flexbox, Custom Properties, and animations.",
        "https://placehold.co/480x360/2d3748/e2e8f0.png?text=CSS+Playlist",
    ),
    (
        "PL_mock3",
        "Node.js Backend Development",
        "Learn how to build robust and scalable server-side applications with Node.js, Express, and MongoDB.",
        "https://placehold.co/480x360/2d3748/e2e8f0.png?text=Node.js+Playlist",
    ),
    (
        "PL_mock4",
        "Full-Stack Project Builds",
        "Follow along as we build complete, real-world applications from front-end to back-end.",
        "https://placehold.co/480x360/2d3748/e2e8f0.png?text=Full-Stack",
    ),
];

fn to_item(&(id, title, description, thumbnail_url): &(&str, &str, &str, &str)) -> FeedItem {
    FeedItem {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        thumbnail_url: thumbnail_url.to_string(),
    }
}

/// The whole sample video list.
pub fn sample_videos() -> Vec<Video> {
    SAMPLE_VIDEOS.iter().map(to_item).collect()
}

/// The first `limit` sample videos.
pub fn sample_videos_truncated(limit: usize) -> Vec<Video> {
    SAMPLE_VIDEOS.iter().take(limit).map(to_item).collect()
}

pub fn sample_playlists() -> Vec<Playlist> {
    SAMPLE_PLAYLISTS.iter().map(to_item).collect()
}
