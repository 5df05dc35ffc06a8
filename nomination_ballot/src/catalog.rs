use lazy_static::lazy_static;
use log::debug;
use serde::Deserialize;

use crate::builder::Builder;
use crate::config::*;

struct StaticNomination {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: IconName,
    options: [&'static str; 4],
}

const BUILTIN_NOMINATIONS: [StaticNomination; 7] = [
    StaticNomination {
        id: "1",
        title: "Лучший продукт года",
        description: "Самый инновационный и востребованный продукт 2024",
        icon: IconName::Trophy,
        options: [
            "Умная колонка Echo Pro",
            "Фитнес-браслет FitMax",
            "Беспроводные наушники AirPods Ultra",
            "Смарт-часы Galaxy Watch 6",
        ],
    },
    StaticNomination {
        id: "2",
        title: "Лучший сервис",
        description: "Сервис с лучшим клиентским опытом",
        icon: IconName::Award,
        options: [
            "Доставка ExpressFood",
            "Стриминг MusicFlow",
            "Такси CityRide",
            "Облачное хранилище CloudSpace",
        ],
    },
    StaticNomination {
        id: "3",
        title: "Открытие года",
        description: "Новая компания или проект, который произвел фурор",
        icon: IconName::Sparkles,
        options: [
            "Стартап AI Helper",
            "Экомагазин GreenChoice",
            "Платформа EduTech",
            "Финтех сервис PayFast",
        ],
    },
    StaticNomination {
        id: "4",
        title: "Лучший дизайн",
        description: "Самый стильный и продуманный дизайн",
        icon: IconName::Palette,
        options: [
            "Мобильное приложение Banko",
            "Сайт DesignHub",
            "Интерфейс SmartHome",
            "Брендинг CoffeeTime",
        ],
    },
    StaticNomination {
        id: "5",
        title: "Инновация года",
        description: "Прорывная технология или идея",
        icon: IconName::Rocket,
        options: [
            "AI-ассистент VoiceGenius",
            "VR-платформа MetaSpace",
            "Квантовый процессор QuantumX",
            "Робот-курьер DeliveryBot",
        ],
    },
    StaticNomination {
        id: "6",
        title: "Выбор сообщества",
        description: "Любимый проект пользователей",
        icon: IconName::Users,
        options: [
            "Социальная сеть FriendZone",
            "Форум TechTalk",
            "Игра PixelWorld",
            "Блог-платформа WriteNow",
        ],
    },
    StaticNomination {
        id: "7",
        title: "Экологичный проект",
        description: "Вклад в устойчивое развитие и экологию",
        icon: IconName::Leaf,
        options: [
            "ЭкоТакси GreenRide",
            "Приложение RecycleIt",
            "Солнечные панели SolarTech",
            "Пластик-переработка EcoPlast",
        ],
    },
];

lazy_static! {
    static ref BUILTIN_CATALOG: Catalog = Catalog::from_checked(
        BUILTIN_NOMINATIONS
            .iter()
            .map(|sn| Nomination {
                id: sn.id.to_string(),
                title: sn.title.to_string(),
                description: sn.description.to_string(),
                icon: sn.icon,
                options: sn.options.iter().map(|o| o.to_string()).collect(),
            })
            .collect()
    );
}

/// The immutable list of nominations offered on the ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Catalog {
    nominations: Vec<Nomination>,
}

// The on-disk form of a nomination. Icons are read as plain strings so that
// an unknown name is reported with the name itself.
#[derive(Deserialize)]
struct RawNomination {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    icon: String,
    options: Vec<String>,
}

impl Catalog {
    /// The nominations of the 2024 vote, shared by the whole process.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN_CATALOG
    }

    /// Builds a catalog, checking identifiers and options.
    pub fn from_nominations(nominations: Vec<Nomination>) -> Result<Catalog, CatalogError> {
        let mut builder = Builder::new();
        for n in nominations.iter() {
            builder.add_nomination_2(n)?;
        }
        builder.build()
    }

    /// Reads a catalog from a JSON array of nominations:
    /// `[{"id": "1", "title": "...", "description": "...", "icon": "Trophy", "options": ["..."]}]`
    pub fn from_json(contents: &str) -> Result<Catalog, CatalogError> {
        let raw: Vec<RawNomination> =
            serde_json::from_str(contents).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut builder = Builder::new();
        for rn in raw {
            let icon: IconName = rn.icon.parse()?;
            builder.add_nomination(&rn.id, &rn.title, &rn.description, icon, &rn.options)?;
        }
        let catalog = builder.build()?;
        debug!("Loaded catalog with {} nominations", catalog.len());
        Ok(catalog)
    }

    // The nominations must already satisfy the builder checks.
    pub(crate) fn from_checked(nominations: Vec<Nomination>) -> Catalog {
        Catalog { nominations }
    }

    pub fn nominations(&self) -> &[Nomination] {
        &self.nominations
    }

    pub fn get(&self, nomination_id: &str) -> Option<&Nomination> {
        self.nominations.iter().find(|n| n.id == nomination_id)
    }

    pub fn len(&self) -> usize {
        self.nominations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nominations.is_empty()
    }
}
