use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::{
    error::{AppError, AppResult},
    models::{
        attribute_names as names, DiversityMode, ProductCandidate, ProductId,
        RecommendationRequest, RecommendationResponse, RecommendationResult, Strategy,
    },
};

use super::{
    attributes::{
        candidate_ids, requested_dimensions, AttributeDimension, AttributeIndex, AttributeSet,
        StrictAttributeFilter,
    },
    catalog::Catalog,
    combiner::ScoreCombiner,
    diversity::{diversity_score, DiversityRanker},
    enrichment::{mine_styling_tips, palette_color_names},
    random::RandomSource,
    reasoning::{ReasoningContext, ReasoningGenerator},
    retrieval::CandidateRetriever,
    scoring::{
        content::{ContentPreferences, KeywordMatcher},
        functional::RoomType,
        style::Style,
        Scorer, ScoringContext,
    },
    weights::{ScoreWeights, WeightCalculator, WeightSignals},
};

/// Number of personalization signals a request can carry
const PERSONALIZATION_SIGNALS: f64 = 7.0;

/// Engine tunables projected from `Config`
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub candidate_limit: usize,
    pub fallback_min_results: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            candidate_limit: 1000,
            fallback_min_results: 3,
        }
    }
}

/// Multi-criteria product recommendation engine
///
/// Holds the immutable lookup tables and the injected collaborators. Requests
/// share nothing mutable, so one engine serves any number of concurrent calls.
#[derive(Clone)]
pub struct RecommendationEngine {
    pipeline: Arc<Pipeline>,
}

struct Pipeline {
    catalog: Arc<dyn Catalog>,
    random: Arc<dyn RandomSource>,
    retriever: CandidateRetriever,
    scorer: Arc<Scorer>,
    weights: WeightCalculator,
    combiner: ScoreCombiner,
    diversity: DiversityRanker,
}

/// Everything the blocking scoring task needs, moved in by value
struct ScoringJob {
    candidates: Vec<ProductCandidate>,
    attributes: AttributeSet,
    context: ScoringContext,
    weights: ScoreWeights,
    reasoning: ReasoningContext,
    rerank: bool,
    limit: usize,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        random: Arc<dyn RandomSource>,
        settings: EngineSettings,
    ) -> Self {
        let retriever = CandidateRetriever::new(
            catalog.clone(),
            settings.candidate_limit,
            settings.fallback_min_results,
        );
        let pipeline = Pipeline {
            catalog,
            random,
            retriever,
            scorer: Arc::new(Scorer::new()),
            weights: WeightCalculator::new(),
            combiner: ScoreCombiner::new(ReasoningGenerator::new()),
            diversity: DiversityRanker::new(),
        };
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Ranked recommendations for one request
    ///
    /// Never fails: any internal error, including a panic anywhere in the
    /// pipeline, degrades to the empty `error_fallback` response.
    pub async fn get_recommendations(
        &self,
        request: &RecommendationRequest,
        user_id: Option<&str>,
    ) -> RecommendationResponse {
        let started = Instant::now();
        let pipeline = self.pipeline.clone();
        let request = request.clone();
        let user_id = user_id.map(str::to_owned);

        // a panic unwinds only this task and surfaces as a JoinError
        let task = async move { pipeline.run(&request, user_id.as_deref(), started).await };
        let outcome = tokio::spawn(task.instrument(tracing::Span::current()))
            .await
            .unwrap_or_else(|e| Err(AppError::Internal(format!("Recommendation task failed: {}", e))));

        match outcome {
            Ok(response) => {
                tracing::info!(
                    strategy = %response.strategy,
                    returned = response.recommendations.len(),
                    total_found = response.total_found,
                    elapsed_ms = response.processing_time_ms,
                    "Recommendations generated"
                );
                response
            }
            Err(e) => {
                tracing::error!(error = %e, "Recommendation pipeline failed; returning fallback");
                RecommendationResponse::error_fallback(elapsed_ms(started))
            }
        }
    }
}

impl Pipeline {
    async fn run(
        &self,
        request: &RecommendationRequest,
        user_id: Option<&str>,
        started: Instant,
    ) -> AppResult<RecommendationResponse> {
        request.validate()?;
        let has_user = user_id.is_some_and(|u| !u.trim().is_empty());
        let strategy = select_strategy(request, has_user);

        tracing::info!(
            keywords = request.product_keywords.len(),
            strict = request.strict_attribute_match,
            has_budget = request.effective_budget().is_some(),
            has_user,
            "Generating recommendations"
        );

        let mut rng = self.random.request_rng();
        let retrieval = self.retriever.retrieve(request, &mut rng).await?;
        if retrieval.broadened > 0 {
            tracing::debug!(broadened = retrieval.broadened, "Candidates include sampled products");
        }
        if retrieval.candidates.is_empty() {
            return Ok(RecommendationResponse::empty(strategy, elapsed_ms(started)));
        }

        let strict_dimensions = if request.strict_attribute_match {
            requested_dimensions(&request.attributes)
        } else {
            Vec::new()
        };

        let context = build_scoring_context(request, has_user)?;
        let ids = candidate_ids(&retrieval.candidates);
        let attributes = self
            .load_attributes(&ids, &context, &strict_dimensions, request)
            .await?;

        let candidates = if strict_dimensions.is_empty() {
            retrieval.candidates
        } else {
            StrictAttributeFilter::new(&request.attributes).apply(retrieval.candidates, &attributes)
        };
        if candidates.is_empty() {
            tracing::info!("Strict attribute filter removed every candidate");
            return Ok(RecommendationResponse::empty(
                Strategy::StrictFilteringZeroResults,
                elapsed_ms(started),
            ));
        }

        let weights = self.weights.calculate(&WeightSignals {
            has_collaborative_data: has_user,
            has_keywords: request.has_keywords(),
            style_count: request.style_preferences.len(),
            has_room_context: request.room_type().is_some(),
            functional_count: request.functional_requirements.len(),
        });
        tracing::debug!(?weights, "Score weights");

        let job = ScoringJob {
            candidates,
            attributes,
            reasoning: reasoning_context(request, &context),
            context,
            weights,
            rerank: should_rerank(request),
            limit: request.max_recommendations,
        };

        let scorer = self.scorer.clone();
        let combiner = self.combiner;
        let diversity = self.diversity;
        let (recommendations, total_found) = run_blocking("Scoring", move || {
            let scores = scorer.score_all(&job.candidates, &job.context, &job.attributes, &mut rng);
            let mut results = combiner.combine(&job.candidates, &scores, &job.weights, &job.reasoning);
            let total = results.len();
            if job.rerank {
                results = diversity.rank(results, &mut rng);
            }
            results.truncate(job.limit);
            (results, total)
        })
        .await?;

        Ok(RecommendationResponse {
            personalization_level: personalization_level(request, has_user),
            diversity_score: diversity_score(&recommendations),
            recommendations,
            total_found,
            processing_time_ms: elapsed_ms(started),
            strategy,
        })
    }

    /// One batched lookup per needed dimension, all issued concurrently
    async fn load_attributes(
        &self,
        ids: &[ProductId],
        context: &ScoringContext,
        strict: &[AttributeDimension],
        request: &RecommendationRequest,
    ) -> AppResult<AttributeSet> {
        use AttributeDimension as D;
        let soft = &context.content;
        let needs = |dimension: D, wanted: bool| wanted || strict.contains(&dimension);
        let strict_on = |dimension: D| strict.contains(&dimension);

        let (colors, materials, textures, patterns, styles, dimensions) = tokio::join!(
            self.lookup(
                ids,
                "colors",
                names::COLORS,
                needs(D::Colors, !soft.colors.is_empty()),
                strict_on(D::Colors),
            ),
            self.lookup(
                ids,
                "materials",
                names::MATERIALS,
                needs(D::Materials, !soft.materials.is_empty()),
                strict_on(D::Materials),
            ),
            self.lookup(
                ids,
                "textures",
                &[names::TEXTURE],
                needs(D::Textures, !soft.textures.is_empty()),
                strict_on(D::Textures),
            ),
            self.lookup(
                ids,
                "patterns",
                &[names::PATTERN],
                needs(D::Patterns, !soft.patterns.is_empty()),
                strict_on(D::Patterns),
            ),
            self.lookup(
                ids,
                "styles",
                &[names::STYLE],
                needs(D::Styles, !context.styles.is_empty()),
                strict_on(D::Styles),
            ),
            self.lookup(
                ids,
                "dimensions",
                names::DIMENSIONS,
                request.dimensions.is_some(),
                false,
            ),
        );

        Ok(AttributeSet {
            colors: colors?,
            materials: materials?,
            textures: textures?,
            patterns: patterns?,
            styles: styles?,
            dimensions: dimensions?,
        })
    }

    /// A failed lookup falls back to an empty index so the dimension scores
    /// neutrally, unless strict matching depends on it.
    async fn lookup(
        &self,
        ids: &[ProductId],
        dimension: &'static str,
        attribute_names: &'static [&'static str],
        needed: bool,
        strict: bool,
    ) -> AppResult<AttributeIndex> {
        if !needed {
            return Ok(AttributeIndex::default());
        }
        match self.catalog.get_attributes(ids, attribute_names).await {
            Ok(rows) => Ok(AttributeIndex::new(rows)),
            Err(e) if strict => Err(AppError::Catalog(format!(
                "{} lookup failed during strict filtering: {}",
                dimension, e
            ))),
            Err(e) => {
                tracing::warn!(dimension, error = %e, "Attribute lookup failed; scoring neutrally");
                Ok(AttributeIndex::default())
            }
        }
    }
}

/// Runs CPU-bound work off the async workers; a panic becomes `AppError::Internal`
async fn run_blocking<T, F>(stage: &'static str, work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("{} task failed: {}", stage, e)))
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn push_unique(target: &mut Vec<String>, values: impl IntoIterator<Item = String>) {
    for value in values {
        let value = value.trim().to_lowercase();
        if !value.is_empty() && !target.contains(&value) {
            target.push(value);
        }
    }
}

/// Folds request fields and designer enrichment into scoring inputs
pub fn build_scoring_context(request: &RecommendationRequest, has_user: bool) -> AppResult<ScoringContext> {
    let keywords = request.normalized_keywords();
    let tips: Vec<String> = mine_styling_tips(&request.enrichment.styling_tips)
        .into_iter()
        .filter(|tip| !keywords.contains(tip))
        .collect();

    let prefs = &request.attributes;
    let mut colors = Vec::new();
    push_unique(&mut colors, prefs.colors.iter().cloned());
    push_unique(&mut colors, request.preference_strings("colors"));
    push_unique(&mut colors, palette_color_names(&request.enrichment.color_palette));

    let mut materials = Vec::new();
    push_unique(&mut materials, prefs.materials.iter().cloned());
    push_unique(&mut materials, request.preference_strings("materials"));

    let mut description_terms = Vec::new();
    push_unique(&mut description_terms, request.style_preferences.iter().cloned());
    push_unique(&mut description_terms, request.functional_requirements.iter().cloned());

    // attribute styles stand in when no explicit style preference was given
    let style_source = if request.style_preferences.is_empty() {
        &prefs.styles
    } else {
        &request.style_preferences
    };
    let mut styles: Vec<Style> = Vec::new();
    for style in style_source.iter().filter_map(|s| Style::parse(s)) {
        if !styles.contains(&style) {
            styles.push(style);
        }
    }

    Ok(ScoringContext {
        content: ContentPreferences {
            keywords: KeywordMatcher::many(&keywords)?,
            tip_terms: KeywordMatcher::many(&tips)?,
            colors,
            materials,
            textures: prefs.textures.clone(),
            patterns: prefs.patterns.clone(),
            dimensions: request.dimensions,
            description_terms,
        },
        styles,
        room: request.room_type().map(|room| RoomType::parse_or_default(Some(room))),
        functional_requirements: request.functional_requirements.clone(),
        budget: request.effective_budget(),
        has_user,
    })
}

fn reasoning_context(request: &RecommendationRequest, context: &ScoringContext) -> ReasoningContext {
    ReasoningContext {
        primary_style: context.styles.first().map(|s| s.label().to_string()),
        room: context.room.map(|r| r.label().to_string()),
        has_budget: context.budget.is_some(),
        has_keywords: request.has_keywords(),
    }
}

/// Diversity re-ranking runs unless an explicit search asks for every match
pub fn should_rerank(request: &RecommendationRequest) -> bool {
    match request.diversity {
        DiversityMode::Always => true,
        DiversityMode::Never => false,
        DiversityMode::Auto => !request.has_keywords(),
    }
}

pub fn select_strategy(request: &RecommendationRequest, has_user: bool) -> Strategy {
    if has_user {
        Strategy::CollaborativeHybrid
    } else if request.has_keywords() {
        Strategy::ContentBasedHybrid
    } else if request.room_type().is_some() || !request.style_preferences.is_empty() {
        Strategy::ContextualContentBased
    } else {
        Strategy::PopularityContentBased
    }
}

/// Fraction of personalization signals the request carries
pub fn personalization_level(request: &RecommendationRequest, has_user: bool) -> f64 {
    let signals = [
        request.has_keywords(),
        !request.style_preferences.is_empty(),
        request.room_type().is_some(),
        request.effective_budget().is_some(),
        !request.functional_requirements.is_empty(),
        !request.attributes.is_empty(),
        has_user,
    ];
    signals.iter().filter(|present| **present).count() as f64 / PERSONALIZATION_SIGNALS
}

/// Result ids in ranked order
pub fn result_ids(results: &[RecommendationResult]) -> Vec<ProductId> {
    results.iter().map(|r| r.product_id).collect()
}
