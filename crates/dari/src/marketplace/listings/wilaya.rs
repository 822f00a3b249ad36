use serde::Serialize;

/// Algerian province used as the top-level location filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wilaya {
    pub code: u8,
    pub name: &'static str,
}

const WILAYA_NAMES: [&str; 58] = [
    "Adrar",
    "Chlef",
    "Laghouat",
    "Oum El Bouaghi",
    "Batna",
    "Bejaia",
    "Biskra",
    "Bechar",
    "Blida",
    "Bouira",
    "Tamanrasset",
    "Tebessa",
    "Tlemcen",
    "Tiaret",
    "Tizi Ouzou",
    "Alger",
    "Djelfa",
    "Jijel",
    "Setif",
    "Saida",
    "Skikda",
    "Sidi Bel Abbes",
    "Annaba",
    "Guelma",
    "Constantine",
    "Medea",
    "Mostaganem",
    "M'Sila",
    "Mascara",
    "Ouargla",
    "Oran",
    "El Bayadh",
    "Illizi",
    "Bordj Bou Arreridj",
    "Boumerdes",
    "El Tarf",
    "Tindouf",
    "Tissemsilt",
    "El Oued",
    "Khenchela",
    "Souk Ahras",
    "Tipaza",
    "Mila",
    "Ain Defla",
    "Naama",
    "Ain Temouchent",
    "Ghardaia",
    "Relizane",
    "Timimoun",
    "Bordj Badji Mokhtar",
    "Ouled Djellal",
    "Beni Abbes",
    "In Salah",
    "In Guezzam",
    "Touggourt",
    "Djanet",
    "El M'Ghair",
    "El Meniaa",
];

impl Wilaya {
    pub fn from_code(code: u8) -> Option<Self> {
        let index = usize::from(code).checked_sub(1)?;
        WILAYA_NAMES.get(index).map(|name| Wilaya { code, name })
    }

    pub fn all() -> impl Iterator<Item = Wilaya> {
        WILAYA_NAMES
            .iter()
            .zip(1u8..)
            .map(|(name, code)| Wilaya { code, name })
    }

    /// Case and accent-insensitive match on the transliterated name ("Bejaia", "béjaïa").
    pub fn find_by_name(raw: &str) -> Option<Self> {
        let wanted = fold(raw);
        if wanted.is_empty() {
            return None;
        }
        Self::all().find(|wilaya| fold(wilaya.name) == wanted)
    }
}

fn fold(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter_map(|ch| {
            let folded = match ch {
                'à' | 'â' | 'ä' | 'À' | 'Â' | 'Ä' => 'a',
                'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
                'î' | 'ï' | 'Î' | 'Ï' => 'i',
                'ô' | 'ö' | 'Ô' | 'Ö' => 'o',
                'ù' | 'û' | 'ü' | 'Ù' | 'Û' | 'Ü' => 'u',
                '\'' | '-' | ' ' => return None,
                other => other.to_ascii_lowercase(),
            };
            Some(folded)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_cover_all_58_provinces() {
        assert_eq!(Wilaya::all().count(), 58);
        assert_eq!(Wilaya::from_code(16).map(|w| w.name), Some("Alger"));
        assert_eq!(Wilaya::from_code(58).map(|w| w.name), Some("El Meniaa"));
        assert!(Wilaya::from_code(0).is_none());
        assert!(Wilaya::from_code(59).is_none());
    }

    #[test]
    fn names_match_loosely() {
        assert_eq!(Wilaya::find_by_name("béjaïa").map(|w| w.code), Some(6));
        assert_eq!(Wilaya::find_by_name("tizi-ouzou").map(|w| w.code), Some(15));
        assert_eq!(Wilaya::find_by_name(" ORAN ").map(|w| w.code), Some(31));
        assert!(Wilaya::find_by_name("Paris").is_none());
        assert!(Wilaya::find_by_name("  ").is_none());
    }
}
