pub mod elevenlabs;
pub mod horoscope;
pub mod ollama;
pub mod pexels;
