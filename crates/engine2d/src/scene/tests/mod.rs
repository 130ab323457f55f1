//! Integration tests for the transform hierarchy driving colliders
