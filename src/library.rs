use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: &'static str,
    pub arabic_text: &'static str,
    pub translation: Option<&'static str>,
    pub target_count: u32,
    pub category: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Collection {
    pub name: &'static str,
    pub dhikrs: &'static [Preset],
}

#[derive(Debug, Serialize)]
pub struct Library {
    pub presets: &'static [Preset],
    pub collections: &'static [Collection],
}

pub fn library() -> Library {
    Library {
        presets: PRESETS,
        collections: COLLECTIONS,
    }
}

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "Sübhanallah",
        arabic_text: "سُبْحَانَ اللّهِ",
        translation: Some("Glory be to Allah"),
        target_count: 33,
        category: "Tesbih",
    },
    Preset {
        name: "Elhamdülillah",
        arabic_text: "اَلْحَمْدُ لِلّهِ",
        translation: Some("All praise is due to Allah"),
        target_count: 33,
        category: "Tesbih",
    },
    Preset {
        name: "Allahu Ekber",
        arabic_text: "اللّهُ أَكْبَرُ",
        translation: Some("Allah is the greatest"),
        target_count: 33,
        category: "Tesbih",
    },
    Preset {
        name: "La ilahe illallah",
        arabic_text: "لَا إِلَهَ إِلَّا اللّهُ",
        translation: Some("There is no god but Allah"),
        target_count: 100,
        category: "Tevhid",
    },
    Preset {
        name: "Estağfirullah",
        arabic_text: "أَسْتَغْفِرُ اللّهَ",
        translation: Some("I seek forgiveness from Allah"),
        target_count: 100,
        category: "İstiğfar",
    },
    Preset {
        name: "Hasbünallahü ve ni'mel vekil",
        arabic_text: "حَسْبُنَا اللّهُ وَنِعْمَ الْوَكِيلُ",
        translation: Some("Allah is sufficient for us, and He is the best guardian"),
        target_count: 33,
        category: "Dua",
    },
    Preset {
        name: "La havle vela kuvvete illa billah",
        arabic_text: "لَا حَوْلَ وَلَا قُوَّةَ إِلَّا بِاللّهِ",
        translation: Some("There is no power nor strength except through Allah"),
        target_count: 33,
        category: "Dua",
    },
    Preset {
        name: "Sübhanallahi ve bihamdihi",
        arabic_text: "سُبْحَانَ اللّهِ وَبِحَمْدِهِ",
        translation: Some("Glory be to Allah and praise be to Him"),
        target_count: 100,
        category: "Tesbih",
    },
    Preset {
        name: "Sübhanallahi'l-azim",
        arabic_text: "سُبْحَانَ اللّهِ الْعَظِيمِ",
        translation: Some("Glory be to Allah, the Magnificent"),
        target_count: 33,
        category: "Tesbih",
    },
    Preset {
        name: "Allahümme salli ala Muhammed",
        arabic_text: "اللَّهُمَّ صَلِّ عَلَى مُحَمَّدٍ",
        translation: Some("O Allah, send blessings upon Muhammad"),
        target_count: 100,
        category: "Salavat",
    },
];

const AFFUWUN: &str = "اللَّهُمَّ إِنَّكَ عَفُوٌّ تُحِبُّ الْعَفْوَ فَاعْفُ عَنِّي";
const AFFUWUN_EN: &str = "O Allah, You are pardoning and love to pardon, so pardon me";

pub const COLLECTIONS: &[Collection] = &[
    Collection {
        name: "Ramadan",
        dhikrs: &[Preset {
            name: "Allahümme inneke afüvvün tühibbül afve fa'fü anni",
            arabic_text: AFFUWUN,
            translation: Some(AFFUWUN_EN),
            target_count: 100,
            category: "Ramazan",
        }],
    },
    Collection {
        name: "Friday",
        dhikrs: &[Preset {
            name: "Allahümme salli ala Muhammedin ve ala ali Muhammed",
            arabic_text: "اللَّهُمَّ صَلِّ عَلَى مُحَمَّدٍ وَعَلَى آلِ مُحَمَّدٍ",
            translation: Some("O Allah, send blessings upon Muhammad and the family of Muhammad"),
            target_count: 100,
            category: "Salavat",
        }],
    },
    Collection {
        name: "Laylat al-Qadr",
        dhikrs: &[Preset {
            name: "Allahümme inneke afüvvün tühibbül afve fa'fü anni",
            arabic_text: AFFUWUN,
            translation: Some(AFFUWUN_EN),
            target_count: 1000,
            category: "Kadir Gecesi",
        }],
    },
    Collection {
        name: "After prayer",
        dhikrs: &[
            Preset {
                name: "Sübhanallah",
                arabic_text: "سُبْحَانَ اللّهِ",
                translation: None,
                target_count: 33,
                category: "Namaz Sonrası",
            },
            Preset {
                name: "Elhamdülillah",
                arabic_text: "اَلْحَمْدُ لِلّهِ",
                translation: None,
                target_count: 33,
                category: "Namaz Sonrası",
            },
            Preset {
                name: "Allahu Ekber",
                arabic_text: "اللّهُ أَكْبَرُ",
                translation: None,
                target_count: 33,
                category: "Namaz Sonrası",
            },
            Preset {
                name: "La ilahe illallahu vahdehu la şerike leh",
                arabic_text: "لَا إِلَهَ إِلَّا اللّهُ وَحْدَهُ لَا شَرِيكَ لَهُ، لَهُ الْمُلْكُ وَلَهُ الْحَمْدُ وَهُوَ عَلَى كُلِّ شَيْءٍ قَدِيرٌ",
                translation: None,
                target_count: 1,
                category: "Namaz Sonrası",
            },
        ],
    },
];
