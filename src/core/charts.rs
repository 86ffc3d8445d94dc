use crate::domain::model::{DietAverages, Recipe};
use crate::utils::error::{EtlError, Result};
use plotters::prelude::*;

const MACRO_NAMES: [&str; 3] = ["Protein(g)", "Carbs(g)", "Fat(g)"];
const MACRO_COLORS: [RGBColor; 3] = [
    RGBColor(76, 114, 176),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
];

fn chart_err<E: std::fmt::Display>(e: E) -> EtlError {
    EtlError::ChartError {
        message: e.to_string(),
    }
}

/// 分組長條圖：每個飲食類型三條（蛋白質/碳水/脂肪）
pub fn render_avg_macros_bar(averages: &[DietAverages]) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1000, 600)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let n = averages.len();
        let y_max = averages
            .iter()
            .map(|d| d.protein_g.max(d.carbs_g).max(d.fat_g))
            .fold(0.0f64, f64::max);
        let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        let mut chart = ChartBuilder::on(&root)
            .caption("Average Macronutrients by Diet Type", ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max)
            .map_err(chart_err)?;

        // 整數刻度對應飲食類型名稱
        let x_formatter = |x: &f64| {
            let rounded = x.round();
            if (x - rounded).abs() < 1e-6 && rounded >= 0.0 && (rounded as usize) < n {
                averages[rounded as usize].diet_type.clone()
            } else {
                String::new()
            }
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&x_formatter)
            .y_desc("Average (g)")
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(chart_err)?;

        for (mi, name) in MACRO_NAMES.iter().enumerate() {
            let offset = -0.3 + 0.2 * mi as f64;
            chart
                .draw_series(averages.iter().enumerate().map(|(di, d)| {
                    let value = [d.protein_g, d.carbs_g, d.fat_g][mi];
                    let x0 = di as f64 + offset;
                    Rectangle::new([(x0, 0.0), (x0 + 0.2, value)], MACRO_COLORS[mi].filled())
                }))
                .map_err(chart_err)?
                .label(*name)
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], MACRO_COLORS[mi].filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg.into_bytes())
}

/// 熱度圖：飲食類型 × 宏量營養素
pub fn render_avg_macros_heatmap(averages: &[DietAverages]) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (900, 600)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let n = averages.len();
        let cells: Vec<f64> = averages
            .iter()
            .flat_map(|d| [d.protein_g, d.carbs_g, d.fat_g])
            .collect();
        let min = cells.iter().copied().fold(f64::INFINITY, f64::min);
        let max = cells.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = if max > min { max - min } else { 1.0 };

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Heatmap: Average Macronutrients by Diet Type",
                ("sans-serif", 24),
            )
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(140)
            .build_cartesian_2d(0f64..3f64, 0f64..n as f64)
            .map_err(chart_err)?;

        let x_formatter = |x: &f64| {
            let rounded = x.round();
            if (x - rounded).abs() < 1e-6 && rounded >= 0.0 && (rounded as usize) < 3 {
                MACRO_NAMES[rounded as usize].to_string()
            } else {
                String::new()
            }
        };
        // 第一個飲食類型畫在最上面，刻度要反過來對應
        let y_formatter = |y: &f64| {
            let rounded = y.round();
            if (y - rounded).abs() < 1e-6 && rounded >= 0.0 && (rounded as usize) < n {
                averages[n - 1 - rounded as usize].diet_type.clone()
            } else {
                String::new()
            }
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(4)
            .y_labels(n + 1)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(averages.iter().enumerate().flat_map(|(di, d)| {
                let row = [d.protein_g, d.carbs_g, d.fat_g];
                let y0 = (n - 1 - di) as f64;
                row.into_iter().enumerate().map(move |(mi, value)| {
                    let t = (value - min) / span;
                    Rectangle::new(
                        [(mi as f64, y0), (mi as f64 + 1.0, y0 + 1.0)],
                        heat_color(t).filled(),
                    )
                })
            }))
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg.into_bytes())
}

/// 散佈圖：高蛋白食譜的碳水 vs 蛋白質，依料理類型上色
pub fn render_top_protein_scatter(recipes: &[Recipe]) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1000, 600)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut cuisines: Vec<&str> = recipes.iter().map(|r| r.cuisine_type.as_str()).collect();
        cuisines.sort();
        cuisines.dedup();

        let x_max = recipes.iter().map(|r| r.carbs_g).fold(0.0f64, f64::max);
        let x_max = if x_max > 0.0 { x_max * 1.1 } else { 1.0 };
        let y_max = recipes.iter().map(|r| r.protein_g).fold(0.0f64, f64::max);
        let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Top Protein Recipes per Diet: Protein vs Carbs",
                ("sans-serif", 24),
            )
            .margin(12)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_desc("Carbs(g)")
            .y_desc("Protein(g)")
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(chart_err)?;

        for (ci, cuisine) in cuisines.iter().enumerate() {
            let color = Palette99::pick(ci).to_rgba();
            chart
                .draw_series(
                    recipes
                        .iter()
                        .filter(|r| r.cuisine_type == *cuisine)
                        .map(|r| Circle::new((r.carbs_g, r.protein_g), 4, color.filled())),
                )
                .map_err(chart_err)?
                .label(*cuisine)
                .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg.into_bytes())
}

fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(lerp(247, 8), lerp(251, 48), lerp(255, 107))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_averages() -> Vec<DietAverages> {
        vec![
            DietAverages {
                diet_type: "keto".to_string(),
                protein_g: 35.0,
                carbs_g: 3.0,
                fat_g: 27.5,
            },
            DietAverages {
                diet_type: "vegan".to_string(),
                protein_g: 19.0,
                carbs_g: 35.0,
                fat_g: 9.0,
            },
        ]
    }

    fn sample_recipe(cuisine: &str, protein: f64, carbs: f64) -> Recipe {
        Recipe {
            diet_type: "keto".to_string(),
            recipe_name: "Test".to_string(),
            cuisine_type: cuisine.to_string(),
            protein_g: protein,
            carbs_g: carbs,
            fat_g: 10.0,
            protein_to_carbs: None,
            carbs_to_fat: None,
        }
    }

    #[test]
    fn test_bar_chart_renders_svg_with_title() {
        let svg = render_avg_macros_bar(&sample_averages()).unwrap();
        let text = String::from_utf8(svg).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("Average Macronutrients by Diet Type"));
    }

    #[test]
    fn test_heatmap_renders_all_diet_labels() {
        let svg = render_avg_macros_heatmap(&sample_averages()).unwrap();
        let text = String::from_utf8(svg).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("keto"));
        assert!(text.contains("vegan"));
    }

    #[test]
    fn test_scatter_renders_cuisine_legend() {
        let recipes = vec![
            sample_recipe("american", 40.0, 5.0),
            sample_recipe("asian", 20.0, 30.0),
        ];
        let svg = render_top_protein_scatter(&recipes).unwrap();
        let text = String::from_utf8(svg).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("american"));
        assert!(text.contains("asian"));
    }

    #[test]
    fn test_heat_color_endpoints() {
        let low = heat_color(0.0);
        assert_eq!((low.0, low.1, low.2), (247, 251, 255));
        let high = heat_color(1.0);
        assert_eq!((high.0, high.1, high.2), (8, 48, 107));
    }
}
