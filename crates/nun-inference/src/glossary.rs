//! Anatomical glossary and prompt construction.
//!
//! The classifier prompt carries three things: the closed region
//! enumeration with its anatomy, a short list of worked synonym mappings
//! (colloquial term → anatomical term → region), and the user text. The
//! ranker prompt carries the matching rules and the candidate listing.

use nun_core::defaults::{MAX_SUGGESTIONS, MIN_SUGGESTIONS};
use nun_core::Region;

/// System message shared by both stages.
pub const SYSTEM_PROMPT: &str = "Sos un experto en codificación quirúrgica del Nomenclador \
Único Nacional (NUN). Siempre usá el glosario proporcionado para traducir términos generales \
como 'cadera', 'muñeca' u 'hombro' en términos anatómicos precisos. Respondé siempre en JSON válido.";

/// A worked colloquial-to-anatomical mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymMapping {
    /// What a clinician might type.
    pub colloquial: String,
    /// Precise anatomical interpretation.
    pub anatomical: String,
    pub region: Region,
}

impl SynonymMapping {
    pub fn new(colloquial: &str, anatomical: &str, region: Region) -> Self {
        Self {
            colloquial: colloquial.to_string(),
            anatomical: anatomical.to_string(),
            region,
        }
    }
}

/// Curated synonym mappings for traumatology and orthopedics.
pub fn default_synonyms() -> Vec<SynonymMapping> {
    vec![
        SynonymMapping::new("fractura de cadera", "fractura de fémur proximal", Region::PelvisHip),
        SynonymMapping::new("fractura de muñeca", "fractura de radio distal", Region::UpperLimb),
        SynonymMapping::new("fractura de hombro", "fractura de húmero proximal", Region::UpperLimb),
        SynonymMapping::new("fractura de tobillo", "fractura de maléolo", Region::LegFoot),
        SynonymMapping::new(
            "fractura de pelvis",
            "fractura de rama isquiopubiana o acetábulo",
            Region::PelvisHip,
        ),
        SynonymMapping::new(
            "fractura de espalda",
            "fractura de columna cervical, dorsal o lumbar",
            Region::Spine,
        ),
        SynonymMapping::new("rotura de ligamento cruzado", "lesión de LCA", Region::Knee),
    ]
}

/// Render the region enumeration as glossary lines.
pub fn region_glossary() -> String {
    Region::ALL
        .iter()
        .map(|r| format!("- {} → {} ({})", r.code(), r.label(), r.anatomy()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the region classification prompt.
pub fn classification_prompt(description: &str, synonyms: &[SynonymMapping]) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "El NUN organiza los procedimientos quirúrgicos por región anatómica. \
Estas son las únicas regiones válidas:\n\n",
    );
    prompt.push_str(&region_glossary());
    prompt.push_str("\n\n");

    if !synonyms.is_empty() {
        prompt.push_str("Sinónimos comunes que deben interpretarse correctamente:\n\n");
        for mapping in synonyms {
            prompt.push_str(&format!(
                "- \"{}\" → {} → {}\n",
                mapping.colloquial,
                mapping.anatomical,
                mapping.region.code()
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "DESCRIPCIÓN DEL PROCEDIMIENTO:\n\"{}\"\n\n",
        description.trim()
    ));

    prompt.push_str(
        "Identificá la región anatómica afectada. Respondé SOLO con un objeto JSON:\n\
{\"region\": \"MS|CO|PC|RO|PP\", \"confianza\": 0.0-1.0, \"motivo\": \"explicación breve\"}\n\
Si no podés determinar la región, usá \"region\": \"\".",
    );

    prompt
}

/// Build the code ranking prompt over an already region-narrowed listing.
pub fn ranking_prompt(description: &str, candidate_listing: &str) -> String {
    format!(
        r#"DESCRIPCIÓN DEL PROCEDIMIENTO INGRESADA POR EL MÉDICO:
"{description}"

CÓDIGOS NUN CANDIDATOS (código - descripción):
{candidate_listing}

INSTRUCCIONES:
1. Priorizá coincidencias textuales exactas con la descripción antes que coincidencias aproximadas.
2. Considerá la complejidad y las palabras clave cuando estén indicadas.
3. Devolvé entre {min} y {max} códigos, ordenados por relevancia (más relevante primero).
4. Sugerí únicamente códigos que aparezcan en la lista de candidatos.
5. La confianza debe ser un número entre 0 y 1.

FORMATO DE RESPUESTA (JSON obligatorio):
{{"codigos_sugeridos": [{{"codigo": "PC.05.07", "motivo": "Explicación breve", "confianza": 0.95}}]}}"#,
        description = description.trim(),
        candidate_listing = candidate_listing,
        min = MIN_SUGGESTIONS,
        max = MAX_SUGGESTIONS,
    )
}
