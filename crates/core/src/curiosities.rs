/// Text shown on a card until it is revealed.
pub const PLACEHOLDER: &str = "Clique para revelar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Curiosity {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const CURIOSITIES: [Curiosity; 8] = [
    Curiosity {
        question: "Qual signo está mais favorecido hoje?",
        answer: "Observe o regente do dia e a Lua. Lua em signos de fogo costuma elevar energia e iniciativa.",
    },
    Curiosity {
        question: "O que é retorno solar?",
        answer: "É o momento anual em que o Sol retorna à posição exata do seu nascimento, abrindo um novo ciclo pessoal.",
    },
    Curiosity {
        question: "Mercúrio retrógrado sempre é ruim?",
        answer: "Não. É um período ótimo para revisar, reorganizar e reescrever. Atenção a contratos e prazos.",
    },
    Curiosity {
        question: "Ascendente muda minha aparência?",
        answer: "Pode influenciar estilo e primeira impressão. É a \"porta\" do mapa: como você se lança ao mundo.",
    },
    Curiosity {
        question: "Casa 10 fala de carreira?",
        answer: "Sim. Ela mostra o topo da sua expressão pública, ambições e direção profissional.",
    },
    Curiosity {
        question: "Eclipse é perigoso?",
        answer: "Eclipses simbolizam viradas e reconfigurações. Cuidar de energia e descanso ajuda na adaptação.",
    },
    Curiosity {
        question: "Compatibilidade é só signo solar?",
        answer: "Não. Sinastria considera vários pontos: Lua, Vênus, Marte, casas e aspectos entre mapas.",
    },
    Curiosity {
        question: "Mapa natal muda?",
        answer: "O mapa em si não muda; quem muda é você. Trânsitos e progressões ativam temas do mapa.",
    },
];

/// Keys that reveal a focused card.
pub fn is_activation_key(key: &str) -> bool {
    key == "Enter" || key == " "
}

/// What one card currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardView<'a> {
    pub question: &'a str,
    pub text: &'a str,
    pub revealed: bool,
}

/// Reveal state of the trivia grid. Reveals are one-way.
#[derive(Debug, Clone)]
pub struct CuriosityGrid {
    items: &'static [Curiosity],
    revealed: Vec<bool>,
}

impl Default for CuriosityGrid {
    fn default() -> Self {
        Self::new(&CURIOSITIES)
    }
}

impl CuriosityGrid {
    pub fn new(items: &'static [Curiosity]) -> Self {
        Self {
            items,
            revealed: vec![false; items.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    /// Reveal card `index`. Returns the answer, or `None` for an unknown index.
    pub fn reveal(&mut self, index: usize) -> Option<&'static str> {
        let slot = self.revealed.get_mut(index)?;
        *slot = true;
        self.items.get(index).map(|c| c.answer)
    }

    /// Keyboard activation on card `index`; reveals on Enter or Space.
    pub fn on_key(&mut self, index: usize, key: &str) -> Option<&'static str> {
        if is_activation_key(key) {
            self.reveal(index)
        } else {
            None
        }
    }

    pub fn card(&self, index: usize) -> Option<CardView<'static>> {
        let item = self.items.get(index)?;
        let revealed = self.is_revealed(index);
        Some(CardView {
            question: item.question,
            text: if revealed { item.answer } else { PLACEHOLDER },
            revealed,
        })
    }

    pub fn cards(&self) -> impl Iterator<Item = CardView<'static>> + '_ {
        (0..self.items.len()).filter_map(|i| self.card(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden() {
        let grid = CuriosityGrid::default();
        assert_eq!(grid.len(), 8);
        assert!(grid.cards().all(|c| !c.revealed && c.text == PLACEHOLDER));
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut grid = CuriosityGrid::default();
        let first = grid.reveal(2);
        assert_eq!(first, Some(CURIOSITIES[2].answer));
        assert_eq!(grid.reveal(2), first);
        assert!(grid.is_revealed(2));
        assert_eq!(grid.card(2).map(|c| c.text), Some(CURIOSITIES[2].answer));
        assert!(!grid.is_revealed(3));
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut grid = CuriosityGrid::default();
        assert_eq!(grid.reveal(99), None);
        assert!(!grid.is_revealed(99));
        assert!(grid.card(99).is_none());
    }

    #[test]
    fn enter_and_space_reveal() {
        let mut grid = CuriosityGrid::default();
        assert_eq!(grid.on_key(0, "a"), None);
        assert!(!grid.is_revealed(0));
        assert!(grid.on_key(0, " ").is_some());
        assert!(grid.on_key(1, "Enter").is_some());
        assert!(grid.is_revealed(0) && grid.is_revealed(1));
    }
}
