mod fake_forge;

pub use fake_forge::FakeForge;
