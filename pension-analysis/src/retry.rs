//! Recherche sous contrainte à budget borné.
//!
//! Deux formes : `refine_bounded` fait évoluer un même candidat (correction de
//! somme), `search_bounded` tire des candidats indépendants (correction d'écart).
//! Aucune des deux ne boucle au-delà de `max_attempts`.

#[derive(Debug, Clone, PartialEq)]
pub enum Retry<T> {
    Accepted { value: T, attempts: usize },
    Exhausted { last: Option<T>, attempts: usize },
}

impl<T> Retry<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Retry::Accepted { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            Retry::Accepted { attempts, .. } | Retry::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Retry::Accepted { value, .. } => Some(value),
            Retry::Exhausted { .. } => None,
        }
    }

    /// Valeur acceptée, sinon dernier candidat produit.
    pub fn into_last(self) -> Option<T> {
        match self {
            Retry::Accepted { value, .. } => Some(value),
            Retry::Exhausted { last, .. } => last,
        }
    }
}

/// Applique `step` au candidat courant jusqu'à ce que `accept` le valide.
/// Le candidat initial est testé avant toute tentative (0 tentative consommée).
pub fn refine_bounded<T>(
    initial: T,
    max_attempts: usize,
    accept: impl Fn(&T) -> bool,
    mut step: impl FnMut(&T) -> T,
) -> Retry<T> {
    let mut current = initial;
    if accept(&current) {
        return Retry::Accepted {
            value: current,
            attempts: 0,
        };
    }

    for attempt in 1..=max_attempts {
        current = step(&current);
        if accept(&current) {
            return Retry::Accepted {
                value: current,
                attempts: attempt,
            };
        }
    }

    Retry::Exhausted {
        last: Some(current),
        attempts: max_attempts,
    }
}

/// Tire jusqu'à `max_attempts` candidats indépendants. `generate` peut ne rien
/// proposer pour une tentative (`None`), la tentative est quand même comptée.
pub fn search_bounded<T>(
    max_attempts: usize,
    mut generate: impl FnMut(usize) -> Option<T>,
    accept: impl Fn(&T) -> bool,
) -> Retry<T> {
    let mut last = None;
    for attempt in 1..=max_attempts {
        if let Some(candidate) = generate(attempt) {
            if accept(&candidate) {
                return Retry::Accepted {
                    value: candidate,
                    attempts: attempt,
                };
            }
            last = Some(candidate);
        }
    }

    Retry::Exhausted {
        last,
        attempts: max_attempts,
    }
}
