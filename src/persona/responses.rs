//! Personality-conditioned message selection
//!
//! Each personality maps to a fixed, non-empty list of templates. Selection
//! is a uniform draw from that list using the caller's RNG, so a seeded RNG
//! gives a reproducible conversation.

use super::Personality;
use crate::error::Result;
use rand::seq::IndexedRandom;
use rand::Rng;

const OUTGOING: &[&str] = &[
    "Hey! Your profile made me smile, how's your week going?",
    "I'm heading to a night market this weekend, ever been to one?",
    "Okay, I have to ask: what's the best festival you've ever been to?",
    "Hi there! I love meeting people from different backgrounds. Tell me about yours!",
    "You seem like great company. Coffee sometime?",
];

const CREATIVE: &[&str] = &[
    "I just finished a painting inspired by my grandmother's textiles. Do you make anything?",
    "What song has been stuck in your head lately?",
    "Your photos have such a good eye for color. Are you into art?",
    "I've been learning traditional calligraphy. It's harder than it looks!",
    "If you could design one day of your life from scratch, what would it look like?",
];

const INTELLECTUAL: &[&str] = &[
    "I'm reading about the history of the Silk Road right now. Any book recommendations?",
    "What's an idea you changed your mind about recently?",
    "Your bio mentions languages. Which one has taught you the most about its culture?",
    "I love a good documentary. Have you seen anything thought-provoking lately?",
    "Do you think food or music says more about a culture?",
];

const ADVENTUROUS: &[&str] = &[
    "Just got back from a hike. Where's the most beautiful place you've traveled?",
    "Spontaneous question: mountains or ocean?",
    "I'm planning a trip and need ideas. Where should I go next?",
    "Have you ever tried a food that completely surprised you abroad?",
    "Want to explore a new neighborhood together sometime?",
];

const ROMANTIC: &[&str] = &[
    "There's something warm about your profile. I'd love to get to know you.",
    "What does a perfect evening look like for you?",
    "I believe the best connections start with a simple hello. So... hello!",
    "Your smile in that photo is lovely. What makes you happiest?",
    "Do you believe in slow dances in the kitchen?",
];

/// Templates for a personality
///
/// The match is exhaustive, so every personality resolves to a list and
/// every list is non-empty.
pub fn templates(personality: Personality) -> &'static [&'static str] {
    match personality {
        Personality::Outgoing => OUTGOING,
        Personality::Creative => CREATIVE,
        Personality::Intellectual => INTELLECTUAL,
        Personality::Adventurous => ADVENTUROUS,
        Personality::Romantic => ROMANTIC,
    }
}

/// Picks persona messages from the personality table
///
/// Stateless by default: the same message may come up twice in a row.
/// With `avoid_immediate_repeat` the previous message is excluded whenever
/// the personality has another template to offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSelector {
    avoid_immediate_repeat: bool,
}

impl ResponseSelector {
    /// Creates a selector
    ///
    /// # Examples
    ///
    /// ```
    /// use cultura::persona::{Personality, ResponseSelector};
    /// use rand::SeedableRng;
    ///
    /// let selector = ResponseSelector::new(false);
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    /// let message = selector.select(Personality::Creative, &mut rng);
    /// assert!(!message.is_empty());
    /// ```
    pub fn new(avoid_immediate_repeat: bool) -> Self {
        Self {
            avoid_immediate_repeat,
        }
    }

    /// Uniformly selects one template for the personality
    pub fn select<R: Rng + ?Sized>(&self, personality: Personality, rng: &mut R) -> String {
        self.select_after(personality, None, rng)
    }

    /// Selects a template, optionally skipping `previous`
    ///
    /// `previous` is only consulted when the selector was built with
    /// `avoid_immediate_repeat`.
    pub fn select_after<R: Rng + ?Sized>(
        &self,
        personality: Personality,
        previous: Option<&str>,
        rng: &mut R,
    ) -> String {
        let pool = templates(personality);

        if self.avoid_immediate_repeat && pool.len() > 1 {
            if let Some(prev) = previous {
                let candidates: Vec<&&str> = pool.iter().filter(|m| **m != prev).collect();
                if let Some(choice) = candidates.choose(rng) {
                    return (**choice).to_string();
                }
            }
        }

        // tables are never empty
        pool.choose(rng).copied().unwrap_or_default().to_string()
    }

    /// Selects a template for a personality given by its tag
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::UnknownPersonality` when the tag is outside
    /// the closed set.
    pub fn select_by_tag<R: Rng + ?Sized>(&self, tag: &str, rng: &mut R) -> Result<String> {
        let personality: Personality = tag.parse()?;
        Ok(self.select(personality, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CulturaError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_personality_has_templates() {
        for p in Personality::ALL {
            let pool = templates(p);
            assert!(!pool.is_empty(), "{} has no templates", p);
            assert!(pool.iter().all(|m| !m.trim().is_empty()));
        }
    }

    #[test]
    fn test_select_draws_from_personality_pool() {
        let selector = ResponseSelector::default();
        let mut rng = StdRng::seed_from_u64(42);
        for p in Personality::ALL {
            for _ in 0..20 {
                let msg = selector.select(p, &mut rng);
                assert!(templates(p).contains(&msg.as_str()));
            }
        }
    }

    #[test]
    fn test_select_is_reproducible_with_seed() {
        let selector = ResponseSelector::default();
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let left: Vec<String> = (0..10)
            .map(|_| selector.select(Personality::Outgoing, &mut a))
            .collect();
        let right: Vec<String> = (0..10)
            .map(|_| selector.select(Personality::Outgoing, &mut b))
            .collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_avoid_immediate_repeat() {
        let selector = ResponseSelector::new(true);
        let mut rng = StdRng::seed_from_u64(1);
        let mut previous = selector.select(Personality::Romantic, &mut rng);
        for _ in 0..50 {
            let next = selector.select_after(Personality::Romantic, Some(&previous), &mut rng);
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_select_by_tag_unknown_is_configuration_error() {
        let selector = ResponseSelector::default();
        let mut rng = StdRng::seed_from_u64(3);
        let err = selector.select_by_tag("shy", &mut rng).unwrap_err();
        let err = err.downcast_ref::<CulturaError>().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_select_by_tag_known() {
        let selector = ResponseSelector::default();
        let mut rng = StdRng::seed_from_u64(3);
        let msg = selector.select_by_tag("adventurous", &mut rng).unwrap();
        assert!(templates(Personality::Adventurous).contains(&msg.as_str()));
    }
}
